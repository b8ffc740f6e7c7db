/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - attestation: 起動時に一度だけ作る AttestationService (secret + gate policy)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::services::attestation::AttestationService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub attestation: Arc<AttestationService>,
}

impl AppState {
    pub fn new(attestation: Arc<AttestationService>) -> Self {
        Self { attestation }
    }
}

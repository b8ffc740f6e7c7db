/*!
 * Request extractors
 *
 * Public API:
 * - Attested (gate が検証済みの attestation を handler に渡す)
 */

mod attestation;

pub use attestation::Attested;

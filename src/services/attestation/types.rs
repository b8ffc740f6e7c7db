use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

/// Claims of a verified attestation token.
///
/// NOTE:
/// - `exp` is mandatory; a token without it never verifies.
/// - `exp`/`nbf` accept fractional NumericDates; they are rounded up to whole
///   seconds, which keeps `now >= exp` exact for an integer clock.
/// - `pay` is the token binding claim. It is absent when the attestation
///   service issued the token through its failover path. A `pay` key that is
///   present but not a string (`null`) is kept as `Some(None)` and never
///   matches.
/// - Everything else (`did`, `ip`, `arc`, ...) is kept as-is in `extra`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttestationClaims {
    #[serde(deserialize_with = "numeric_date")]
    pub exp: u64,

    #[serde(
        default,
        deserialize_with = "optional_numeric_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub nbf: Option<u64>,

    #[serde(
        default,
        rename = "pay",
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub binding: Option<Option<String>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AttestationClaims {
    /// True when the token carries a `pay` key at all.
    pub fn has_binding(&self) -> bool {
        self.binding.is_some()
    }

    pub fn binding_value(&self) -> Option<&str> {
        self.binding.as_ref().and_then(|v| v.as_deref())
    }
}

// Runs only when the key is present, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn numeric_date<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 {
        return Err(D::Error::custom(format!("invalid NumericDate: {}", value)));
    }
    Ok(value.ceil() as u64)
}

fn optional_numeric_date<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    numeric_date(deserializer).map(Some)
}

/// Outcome attached to a request by the attestation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Authorized,
    Unauthenticated,
    Forbidden,
    // Token carried no binding claim; accepted without a binding check.
    PassthroughFailover,
}

/// What the gate hands to handlers through request extensions.
#[derive(Debug, Clone)]
pub struct VerifiedAttestation {
    pub claims: AttestationClaims,
    pub decision: AuthDecision,
}

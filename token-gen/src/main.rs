use std::time::{SystemTime, UNIX_EPOCH};

use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use clap::{Parser, ValueEnum};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Mint an example attestation token (JWS compact serialization) for manual testing.
///
/// - Header: {"typ":"JWT","alg":"HS256"} (or "none" with `--alg none`)
/// - Claims: exp, optional pay (binding digest), optional did
/// - Signs "base64url(header).base64url(payload)" with HMAC-SHA256 using the
///   same base64 secret the server reads from APPROOV_BASE64_SECRET
///
/// Output can be pasted into `curl -H "Approov-Token: <token>"`.
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Base64 encoded shared secret (APPROOV_BASE64_SECRET)
    #[arg(long, env = "APPROOV_BASE64_SECRET")]
    secret: String,

    /// Seconds until the token expires. Negative values mint an already expired token.
    #[arg(long, default_value_t = 300, allow_negative_numbers = true)]
    expires_in: i64,

    /// Value of the bound header (e.g. "Bearer xyz"). Its digest becomes the `pay` claim.
    #[arg(long)]
    bind: Option<String>,

    /// Optional device id claim
    #[arg(long)]
    did: Option<String>,

    /// Header algorithm. `none` drops the signature and is expected to be rejected.
    #[arg(long, value_enum, default_value_t = Alg::Hs256)]
    alg: Alg,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Alg {
    Hs256,
    None,
}

fn b64url_json(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let s = serde_json::to_string(value)?;
    Ok(URL_SAFE_NO_PAD.encode(s.as_bytes()))
}

// Must match the server side binding digest: standard base64 with padding.
fn binding_digest(value: &str) -> String {
    STANDARD.encode(Sha256::digest(value.as_bytes()))
}

fn now_unix() -> Result<i64, Box<dyn std::error::Error>> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let secret = STANDARD.decode(args.secret.trim())?;
    if secret.is_empty() {
        return Err("secret must not be empty".into());
    }

    let exp = now_unix()? + args.expires_in;
    let pay = args.bind.as_deref().map(binding_digest);

    let header = match args.alg {
        Alg::Hs256 => serde_json::json!({ "typ": "JWT", "alg": "HS256" }),
        Alg::None => serde_json::json!({ "typ": "JWT", "alg": "none" }),
    };

    let mut claims = serde_json::Map::new();
    claims.insert("exp".to_string(), serde_json::Value::Number(exp.into()));
    if let Some(pay) = pay.clone() {
        claims.insert("pay".to_string(), serde_json::Value::String(pay));
    }
    if let Some(did) = args.did.clone() {
        claims.insert("did".to_string(), serde_json::Value::String(did));
    }

    let payload = serde_json::Value::Object(claims);
    let signing_input = format!("{}.{}", b64url_json(&header)?, b64url_json(&payload)?);

    let token = match args.alg {
        Alg::Hs256 => {
            let mut mac = HmacSha256::new_from_slice(&secret)?;
            mac.update(signing_input.as_bytes());
            let sig = mac.finalize().into_bytes();
            format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(sig))
        }
        Alg::None => format!("{}.", signing_input),
    };

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    println!("token: {}", token);
    println!("exp: {}", exp);
    match pay {
        Some(pay) => println!("pay: {}", pay),
        None => println!("pay: (none, failover shape)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_digest_matches_server_encoding() {
        // printf "Bearer xyz" | openssl dgst -sha256 -binary | base64
        assert_eq!(
            binding_digest("Bearer xyz"),
            "zyc3Ntxgrok+f83ynVWygiLlbsRSBgJKn5TLWxgJTvs="
        );
    }
}

use crate::cli::args::{CliArgs, Command};
use crate::export::QuotePolicy;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    match &args.command {
        Command::Export {
            output,
            quote_policy,
            ..
        } => {
            if let Some(raw) = quote_policy.as_deref() {
                QuotePolicy::parse(raw)
                    .ok_or_else(|| format!("invalid --quote-policy '{raw}', expected doubled or verbatim"))?;
            }
            if let Some(name) = output.as_deref() {
                if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
                    return Err(format!("invalid --output '{name}', expected a bare filename"));
                }
            }
        }
        Command::Fetch { method, header, .. } => {
            if let Some(raw) = method.as_deref() {
                reqwest::Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
                    .map_err(|_| format!("invalid --method '{raw}'"))?;
            }
            for line in header {
                crate::fetch::parse_header_line(line)
                    .ok_or_else(|| format!("invalid --header '{line}', expected 'Key: Value'"))?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn rejects_unknown_quote_policy() {
        let args = CliArgs::parse_from(["logdesk", "export", "-i", "p.html", "--quote-policy", "tsv"]);
        assert!(validate(&args).is_err());
    }

    #[test]
    fn rejects_output_with_directories() {
        let args = CliArgs::parse_from(["logdesk", "export", "-i", "p.html", "-o", "../x.csv"]);
        assert!(validate(&args).is_err());
    }

    #[test]
    fn rejects_malformed_headers() {
        let args = CliArgs::parse_from(["logdesk", "fetch", "-u", "http://x/", "-H", "nocolon"]);
        assert!(validate(&args).is_err());
        let args = CliArgs::parse_from(["logdesk", "fetch", "-u", "http://x/", "-H", "A: b", "-X", "post"]);
        assert!(validate(&args).is_ok());
    }
}

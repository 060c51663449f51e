//! Property-based tests for rust_file_logger using proptest

use chrono::{Local, TimeZone};
use proptest::prelude::*;
use rust_file_logger::core::{
    format_bytes, CallSite, EntryBuffer, EntryFormatter, FormatToken, MemoryDisplay,
    MemoryReading, RenderContext, RetentionWindow, Severity, StructuredFormatter,
    TemplateFormatter,
};

fn any_severity() -> impl Strategy<Value = Severity> {
    proptest::sample::select(Severity::ALL.to_vec())
}

fn any_token() -> impl Strategy<Value = FormatToken> {
    proptest::sample::select(FormatToken::ALL.to_vec())
}

fn call_site() -> CallSite {
    CallSite {
        file: "src/jobs/worker.rs".to_string(),
        line: 42,
        function: "run".to_string(),
        class: "Worker".to_string(),
    }
}

fn context<'a>(
    severity: Severity,
    message: &'a str,
    value: Option<&'a str>,
    call_site: &'a CallSite,
) -> RenderContext<'a> {
    RenderContext {
        severity,
        message,
        value,
        datetime: "2024-01-15 09:00:00",
        call_site,
        memory: MemoryReading {
            current: 4096,
            peak: 8192,
        },
        memory_display: MemoryDisplay::default(),
    }
}

// ============================================================================
// Severity Tests
// ============================================================================

proptest! {
    /// Test that Severity string conversions roundtrip correctly
    #[test]
    fn test_severity_str_roundtrip(severity in any_severity()) {
        let parsed: Severity = severity.as_str().parse().unwrap();
        prop_assert_eq!(severity, parsed);
        prop_assert_eq!(format!("{}", severity), severity.as_str());
    }

    /// Test that parsing ignores case
    #[test]
    fn test_severity_case_insensitive(severity in any_severity(), upper in any::<bool>()) {
        let input = if upper {
            severity.as_str().to_uppercase()
        } else {
            severity.as_str().to_string()
        };
        prop_assert_eq!(input.parse::<Severity>(), Ok(severity));
    }

    /// Test that ordering matches the position in Severity::ALL
    #[test]
    fn test_severity_ordering(a in any_severity(), b in any_severity()) {
        let index = |s: Severity| Severity::ALL.iter().position(|x| *x == s).unwrap();
        prop_assert_eq!(a.cmp(&b), index(a).cmp(&index(b)));
    }
}

// ============================================================================
// FormatToken Tests
// ============================================================================

proptest! {
    /// Both the bare key and the %key% delimiter parse back to the token
    #[test]
    fn test_token_names_roundtrip(token in any_token()) {
        prop_assert_eq!(token.key().parse::<FormatToken>(), Ok(token));
        prop_assert_eq!(token.delimiter().parse::<FormatToken>(), Ok(token));
        prop_assert_eq!(token.delimiter(), format!("%{}%", token.key()));
    }
}

// ============================================================================
// Memory Formatting Tests
// ============================================================================

proptest! {
    /// Test that values below 1KB are printed as whole bytes
    #[test]
    fn test_format_bytes_small(bytes in 0u64..1024, precision in 0usize..6) {
        prop_assert_eq!(format_bytes(bytes, precision), format!("{}B", bytes));
    }

    /// Test that the scaled number stays within its unit and has no trailing zeros
    #[test]
    fn test_format_bytes_scaled(bytes in 1024u64..(1u64 << 40), precision in 0usize..6) {
        let formatted = format_bytes(bytes, precision);
        let (number, unit) = formatted.split_at(formatted.len() - 2);

        prop_assert!(["KB", "MB", "GB"].contains(&unit), "unexpected unit in {}", formatted);
        let value: f64 = number.parse().unwrap();
        prop_assert!((1.0..=1024.0 * 1024.0).contains(&value));
        if unit != "GB" {
            prop_assert!(value <= 1024.0);
        }
        prop_assert!(!number.ends_with('.'));
        if number.contains('.') {
            prop_assert!(!number.ends_with('0'));
        }
    }
}

// ============================================================================
// Formatter Tests
// ============================================================================

proptest! {
    /// Rendering the same context twice gives the same text
    #[test]
    fn test_template_render_is_idempotent(
        severity in any_severity(),
        message in "[a-zA-Z0-9 _.-]*",
        tokens in proptest::collection::vec(any_token(), 0..6),
    ) {
        let site = call_site();
        let ctx = context(severity, &message, None, &site);
        let template: String = tokens.iter().map(|t| t.delimiter()).collect::<Vec<_>>().join(" ");

        prop_assert_eq!(
            TemplateFormatter.render(&template, &ctx),
            TemplateFormatter.render(&template, &ctx)
        );
    }

    /// Templates without tokens render as their right-trimmed text
    #[test]
    fn test_template_without_tokens(text in "[a-zA-Z0-9 :\\[\\]]*", message in "[a-z]*") {
        let site = call_site();
        let ctx = context(Severity::Info, &message, None, &site);
        prop_assert_eq!(TemplateFormatter.render(&text, &ctx), text.trim_end());
    }

    /// Structured key order never depends on the requested order
    #[test]
    fn test_structured_key_order_is_canonical(
        tokens in Just(FormatToken::ALL.iter().map(|t| t.key().to_string()).collect::<Vec<_>>())
            .prop_shuffle(),
        message in "[a-z]{1,12}",
    ) {
        let site = call_site();
        let ctx = context(Severity::Notice, &message, None, &site);
        let rendered = StructuredFormatter.render(&tokens, &ctx);

        let parsed: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&rendered).unwrap();
        let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();
        let expected: Vec<&str> = FormatToken::ALL.iter().map(|t| t.key()).collect();
        prop_assert_eq!(keys, expected);
    }

    /// An attached value always turns the message into the key
    #[test]
    fn test_structured_value_keys_by_message(key in "[a-z_]{1,12}", value in "[ -~]{0,20}") {
        prop_assume!(key != "level");
        let site = call_site();
        let ctx = context(Severity::Debug, &key, Some(&value), &site);
        let tokens = vec!["level".to_string(), "message".to_string()];

        let parsed: serde_json::Value =
            serde_json::from_str(&StructuredFormatter.render(&tokens, &ctx)).unwrap();
        prop_assert_eq!(&parsed[&key], &serde_json::Value::String(value));
        prop_assert_eq!(&parsed["level"], "debug");
    }
}

// ============================================================================
// Buffer and Rotation Tests
// ============================================================================

proptest! {
    /// The payload holds every entry, in order, one per line
    #[test]
    fn test_buffer_payload_lines(entries in proptest::collection::vec("[a-zA-Z0-9 ]*", 0..50)) {
        let mut buffer = EntryBuffer::new();
        for entry in &entries {
            buffer.push(entry.clone());
        }

        let payload = buffer.payload();
        prop_assert_eq!(payload.matches('\n').count(), entries.len());
        let lines: Vec<&str> = payload.split_terminator('\n').collect();
        prop_assert_eq!(lines, entries.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// The cutoff is always exactly `retention_days` calendar days back
    #[test]
    fn test_retention_cutoff(days in 1i64..3650, hour in 0u32..24) {
        let now = Local.with_ymd_and_hms(2024, 7, 1, hour, 30, 0).unwrap();
        let cutoff = RetentionWindow::days(days).cutoff(&now).unwrap();
        prop_assert_eq!((now.date_naive() - cutoff).num_days(), days);
        prop_assert_eq!(RetentionWindow::disabled().cutoff(&now), None);
    }
}

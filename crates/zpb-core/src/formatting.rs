//! Presentation: turns API payloads into Telegram-HTML strings.
//!
//! Pure and stateless; the router decides *what* to send, these decide how
//! it reads.

use serde_json::Value;

use crate::notify::DepositEvent;

pub const SERVICE_UNAVAILABLE: &str =
    "The service is temporarily unavailable. Please try again later.";

pub const NOT_AUTHORIZED: &str = "No API token is enrolled for your account.";

pub const REFRESHED: &str = "Data refreshed.";

pub const PAYMENT_QUERY_PROMPT: &str = "Send the <b>payment ID</b> or the <b>TRON address</b>.\n\
     Example: <code>7747b8f0-6970-4f38-bcfd-95e6560e49db</code>";

pub const PAYMENT_QUERY_EMPTY: &str = "Send the ID or the address as a single message.";

pub const WITHDRAW_PROMPT: &str =
    "Enter the <b>destination address</b> for the USDT TRC-20 withdrawal (TRON address).";

pub const WITHDRAW_BAD_ADDRESS: &str = "That does not look like a TRON address.\n\
     Example format: <b>TKTgEtjonYPdCWDs7bUb9dUUwYikceDabx</b>\n\
     Send the address again.";

pub const NO_PAYMENTS_FOUND: &str = "No payments found.";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Non-5xx remote failure, echoed to the operator verbatim.
pub fn request_failed(status: u16, payload: &Value) -> String {
    format!(
        "Request failed: {status}\nResponse:\n{}",
        escape_html(&value_text(payload))
    )
}

pub fn payment_not_found(query: &str) -> String {
    format!("Payment <b>{}</b> was not found.", escape_html(query))
}

// ============== Account summary ==============

pub fn merchant_summary(info: &Value) -> String {
    let balance = info
        .get("balance")
        .and_then(as_f64)
        .unwrap_or(0.0);
    let paid_today = field(info, "paid_payments_today", "Available soon.");
    let paid_total = field(info, "paid_payments_total", "Available soon.");

    format!(
        "💵 Balance: <b>{balance:.4} USDT</b>\n\n\
         📅 Payments paid today: <b>{paid_today}</b>\n\
         ✅ Payments paid in total: <b>{paid_total}</b>"
    )
}

// ============== Payments ==============

const STATUS_LABELS: &[(&str, &str)] = &[
    ("pending", "Awaiting payment"),
    ("paid", "Paid"),
    ("underpaid", "Underpaid"),
    ("expired", "Expired"),
    ("closed", "Closed"),
    ("error", "Error"),
];

pub fn status_label(status: Option<&Value>) -> String {
    let Some(s) = status.map(value_text).filter(|s| !s.is_empty()) else {
        return "Unknown".to_string();
    };
    let lower = s.to_lowercase();
    STATUS_LABELS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, label)| label.to_string())
        .unwrap_or(lower)
}

/// One payment as a compact list entry.
pub fn payment_block(p: &Value) -> String {
    let id = field(p, "id", "—");
    let address = field(p, "tron_address", "—");
    let status = status_label(p.get("status"));
    let created = format_dt_short(p.get("created_at"));
    let expires = format_dt_short(p.get("expires_at"));

    let amount = field(p, "amount", "-");
    let to_pay = field(p, "amount_to_pay", "-");
    let paid = field(p, "amount_paid", "-");

    [
        format!("<i>ID</i>: <code>{id}</code>"),
        format!("<i>Status</i>: <b>{status}</b>"),
        format!("<i>Address</i>: <code>{address}</code>"),
        format!("<i>Created</i>: <b>{created}</b>  •  Until: <b>{expires}</b>"),
        format!("Amount: <b>{amount}</b>  •  <i>To pay</i>: <b>{to_pay}</b>  •  <i>Paid</i>: <b>{paid}</b>"),
    ]
    .join("\n")
}

/// The recent-payments reply, or `None` when the payload holds no payments.
pub fn payments_list(payload: &Value) -> Option<String> {
    let payments = payload.get("payments")?.as_array()?;
    if payments.is_empty() {
        return None;
    }

    let blocks: Vec<String> = payments
        .iter()
        .filter(|p| p.is_object())
        .map(payment_block)
        .collect();
    if blocks.is_empty() {
        return None;
    }

    let count = field(payload, "count", "?");
    Some(format!(
        "Last {count} payments (closed excluded):\n\n{}",
        blocks.join("\n\n")
    ))
}

/// Full payment detail for the lookup flow.
pub fn payment_details(p: &Value) -> String {
    if !p.is_object() {
        return value_text(p);
    }
    if p.get("status").and_then(Value::as_str) == Some("closed") {
        return "The payment is <b>closed</b>.".to_string();
    }

    let id = field(p, "id", "—");
    let address = field(p, "tron_address", "—");
    let status = status_label(p.get("status"));
    let created = format_dt_short(p.get("created_at"));
    let expires = format_dt_short(p.get("expires_at"));

    let mut amount_lines = Vec::new();
    if let Some(v) = p.get("amount") {
        amount_lines.push(format!("<i>Amount</i>: <b>{}</b>", value_text(v)));
    }
    if let Some(v) = p.get("amount_to_pay") {
        amount_lines.push(format!("<i>To pay</i>: <b>{}</b>", value_text(v)));
    }
    if let Some(v) = p.get("amount_paid") {
        amount_lines.push(format!("<i>Paid</i>: <b>{}</b>", value_text(v)));
    }
    let amount_section = if amount_lines.is_empty() {
        String::new()
    } else {
        amount_lines.join("\n") + "\n"
    };

    let metadata = match p.get("metadata") {
        Some(Value::Object(map)) if !map.is_empty() => map
            .iter()
            .map(|(k, v)| format!("{k}={}", value_text(v)))
            .collect::<Vec<_>>()
            .join(", "),
        None | Some(Value::Null) => "—".to_string(),
        Some(other) => value_text(other),
    };

    let deposits = p
        .get("deposits")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let deposit_blocks: Vec<String> = deposits
        .iter()
        .filter(|d| d.is_object())
        .map(deposit_block)
        .collect();
    let deposits_text = if deposit_blocks.is_empty() {
        "—".to_string()
    } else {
        deposit_blocks.join("\n")
    };

    format!(
        "<b>Payment</b>\n\
         <i>ID</i>: <code>{id}</code>\n\
         <i>Status</i>: <b>{status}</b>\n\
         <i>Address</i>: <code>{address}</code>\n\
         ⏱️ <i>Created</i>: <b>{created}</b>\n\
         ⌛️ <i>Expires</i>: <b>{expires}</b>\n\
         {amount_section}\
         <i>Metadata</i>: <code>{}</code>\n\n\
         📥 <b>Deposits ({})</b>\n\
         {deposits_text}",
        escape_html(&metadata),
        deposits.len(),
    )
}

fn deposit_block(d: &Value) -> String {
    let id = escape_html(&field(d, "id", "—"));
    let created = escape_html(&format_dt_short(d.get("created_at")));
    let amount = escape_html(&field(d, "amount", "—"));
    let txid = escape_html(&field(d, "txid", "—"));

    format!(
        "• <i>ID</i>: <code>{id}</code>  •    ⏱️: <b>{created}</b>\n  \
         💵: <b>{amount} USDT</b>\n  \
         <i>TXID</i>: <code>{txid}</code>"
    )
}

// ============== Withdrawal ==============

/// The three-way withdrawal outcome. `success == true` is the success
/// discriminator; `status` selects the below-minimum case.
pub fn withdraw_reply(payload: &Value, to_address: &str) -> String {
    if payload.get("success").and_then(Value::as_bool) == Some(true) {
        return format!(
            "✅ Withdrawal created. Expect the transfer to {to_address} <b>(within an hour)</b>."
        );
    }
    if payload.get("status").and_then(Value::as_str) == Some("under_minimum_withdrawal_amount") {
        return "❕ The amount is below the minimum withdrawal threshold. \
                Withdraw once the balance exceeds it."
            .to_string();
    }
    "❌ The withdrawal could not be completed. Contact support.".to_string()
}

// ============== Deposit notification ==============

pub fn deposit_notification(event: &DepositEvent) -> String {
    format!(
        "💸 New deposit.\n\n\
         Address: <code><b>{}</b></code>\n\
         Amount: <b><i>{}</i></b>\n\n\
         Payment status: {}",
        escape_html(&event.address),
        escape_html(&value_text(&event.amount)),
        status_label(Some(&Value::String(event.new_status.clone()))),
    )
}

// ============== Scalar helpers ==============

/// The remote sends numbers both as JSON numbers and as decimal strings.
fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Render a JSON scalar without the quotes `Value`'s `Display` would add.
fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field(p: &Value, key: &str, default: &str) -> String {
    p.get(key)
        .filter(|v| !v.is_null())
        .map(value_text)
        .unwrap_or_else(|| default.to_string())
}

/// `DD.MM HH:MM` for ISO timestamps, the raw value otherwise.
fn format_dt_short(value: Option<&Value>) -> String {
    let Some(v) = value.filter(|v| !v.is_null()) else {
        return "—".to_string();
    };
    let Some(s) = v.as_str() else {
        return value_text(v);
    };

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.format("%d.%m %H:%M").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%d.%m %H:%M").to_string();
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn summary_renders_balance_to_four_places() {
        let text = merchant_summary(&json!({"balance": "12.5", "paid_payments_today": 3}));
        assert!(text.contains("12.5000 USDT"));
        assert!(text.contains("<b>3</b>"));
        // Missing totals fall back to the placeholder.
        assert!(text.contains("Available soon."));
    }

    #[test]
    fn summary_defaults_balance_to_zero() {
        let text = merchant_summary(&json!({}));
        assert!(text.contains("0.0000 USDT"));
    }

    #[test]
    fn status_labels() {
        assert_eq!(status_label(Some(&json!("pending"))), "Awaiting payment");
        assert_eq!(status_label(Some(&json!("PAID"))), "Paid");
        assert_eq!(status_label(Some(&json!("weird"))), "weird");
        assert_eq!(status_label(None), "Unknown");
    }

    #[test]
    fn short_timestamps() {
        assert_eq!(format_dt_short(Some(&json!("2026-03-02T09:15:00"))), "02.03 09:15");
        assert_eq!(
            format_dt_short(Some(&json!("2026-03-02T09:15:00+00:00"))),
            "02.03 09:15"
        );
        assert_eq!(format_dt_short(Some(&json!("not a date"))), "not a date");
        assert_eq!(format_dt_short(None), "—");
    }

    #[test]
    fn closed_payment_collapses_to_one_line() {
        let text = payment_details(&json!({"status": "closed", "id": "x"}));
        assert_eq!(text, "The payment is <b>closed</b>.");
    }

    #[test]
    fn payment_details_lists_deposits() {
        let text = payment_details(&json!({
            "id": "p-1",
            "status": "paid",
            "tron_address": "Txyz",
            "deposits": [
                {"id": "d-1", "amount": "5", "txid": "ab<cd"},
                {"id": "d-2", "amount": 7},
            ],
        }));
        assert!(text.contains("Deposits (2)"));
        assert!(text.contains("<code>d-1</code>"));
        assert!(text.contains("ab&lt;cd"));
        assert!(text.contains("<b>7 USDT</b>"));
    }

    #[test]
    fn payments_list_empty_is_none() {
        assert!(payments_list(&json!({"payments": []})).is_none());
        assert!(payments_list(&json!({"count": 0})).is_none());
        assert!(payments_list(&json!("nope")).is_none());
    }

    #[test]
    fn payments_list_joins_blocks() {
        let text = payments_list(&json!({
            "count": 2,
            "payments": [{"id": "a"}, {"id": "b"}],
        }))
        .unwrap();
        assert!(text.starts_with("Last 2 payments"));
        assert!(text.contains("<code>a</code>"));
        assert!(text.contains("<code>b</code>"));
    }

    #[test]
    fn withdraw_outcomes() {
        let ok = withdraw_reply(&json!({"success": true}), "Taddr");
        assert!(ok.starts_with('✅'));
        assert!(ok.contains("Taddr"));

        let low = withdraw_reply(
            &json!({"success": false, "status": "under_minimum_withdrawal_amount"}),
            "Taddr",
        );
        assert!(low.starts_with('❕'));

        assert!(withdraw_reply(&json!({"success": false}), "T").starts_with('❌'));
        assert!(withdraw_reply(&json!("garbage"), "T").starts_with('❌'));
    }

    #[test]
    fn deposit_notification_text() {
        let ev = DepositEvent {
            address: "Taddr".to_string(),
            amount: json!("12.34"),
            new_status: "paid".to_string(),
            merchant_api_token: "tok".to_string(),
        };
        let text = deposit_notification(&ev);
        assert!(text.contains("Taddr"));
        assert!(text.contains("12.34"));
        assert!(text.contains("Paid"));
    }
}

use crate::{Alert, AlertType};

pub struct EmailTemplate;

impl EmailTemplate {
    pub fn render(alert: &Alert) -> String {
        let body_content = match &alert.alert_type {
            AlertType::NewStock {
                symbol,
                change_percentage,
                detected_at,
            } => {
                let symbol = escape(symbol);
                format!(
                    r#"<div style="background:#22c55e;color:#fff;padding:12px 20px;border-radius:8px 8px 0 0;font-size:18px;font-weight:700;">NEW STOCK &mdash; {symbol}</div>
<table style="width:100%;border-collapse:collapse;">
  <tr><td style="padding:8px 12px;color:#94a3b8;">Symbol</td><td style="padding:8px 12px;font-weight:600;">{symbol}</td></tr>
  <tr style="background:#f8fafc;"><td style="padding:8px 12px;color:#94a3b8;">Change</td><td style="padding:8px 12px;font-weight:600;color:#22c55e;">{change}</td></tr>
  <tr><td style="padding:8px 12px;color:#94a3b8;">Detected</td><td style="padding:8px 12px;font-weight:600;">{detected}</td></tr>
</table>"#,
                    change = escape(change_percentage),
                    detected = escape(detected_at),
                )
            }
            AlertType::ProcessingError { message, payload } => {
                let pretty = serde_json::from_str::<serde_json::Value>(payload)
                    .and_then(|v| serde_json::to_string_pretty(&v))
                    .unwrap_or_else(|_| payload.clone());
                format!(
                    r#"<div style="background:#ef4444;color:#fff;padding:12px 20px;border-radius:8px 8px 0 0;font-size:18px;font-weight:700;">Error in Stock Processing</div>
<div style="padding:16px 20px;">
  <p style="color:#334155;font-weight:600;margin:0 0 8px;">Error Details:</p>
  <pre style="background:#f8fafc;padding:12px;white-space:pre-wrap;">{message}</pre>
  <p style="color:#334155;font-weight:600;margin:16px 0 8px;">Payload:</p>
  <pre style="background:#f8fafc;padding:12px;white-space:pre-wrap;">{payload}</pre>
</div>"#,
                    message = escape(message),
                    payload = escape(&pretty),
                )
            }
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1"></head>
<body style="margin:0;padding:0;background:#f1f5f9;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;">
<table width="100%" cellpadding="0" cellspacing="0" style="background:#f1f5f9;padding:32px 0;">
  <tr><td align="center">
    <table width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;overflow:hidden;box-shadow:0 1px 3px rgba(0,0,0,0.1);">
      <tr><td>
        {body_content}
      </td></tr>
      <tr><td style="padding:16px 20px;border-top:1px solid #e2e8f0;">
        <p style="margin:0;color:#94a3b8;font-size:12px;">
          {msg}
          <br>Sent at {ts} UTC
        </p>
      </td></tr>
    </table>
    <p style="color:#94a3b8;font-size:11px;margin-top:16px;">Momentum Scanner Notification Service</p>
  </td></tr>
</table>
</body>
</html>"#,
            msg = escape(&alert.message),
            ts = alert.timestamp.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

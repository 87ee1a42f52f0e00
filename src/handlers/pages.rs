//! Static return/cancel pages the gateway redirects buyers to after the
//! hosted checkout. The license itself is delivered in-app via activation,
//! so these pages only confirm the outcome.

use axum::response::Html;
use serde::Deserialize;

use crate::extractors::Query;

#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub order_code: Option<i64>,
}

pub async fn payment_success(Query(query): Query<ReturnQuery>) -> Html<String> {
    let order_line = match query.order_code {
        Some(code) => format!("<p>Order code: {}</p>", code),
        None => String::new(),
    };
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Payment successful</title>
  <style>
    body {{ font-family: Arial, sans-serif; text-align: center; padding: 50px; }}
    .success {{ color: green; font-size: 24px; }}
    .info {{ margin-top: 20px; }}
  </style>
</head>
<body>
  <div class="success">Payment successful</div>
  <div class="info">
    {}
    <p>Your license will be activated automatically in the application.</p>
    <p>You can close this window.</p>
  </div>
</body>
</html>"#,
        order_line
    ))
}

pub async fn payment_cancel() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Payment cancelled</title>
  <style>
    body { font-family: Arial, sans-serif; text-align: center; padding: 50px; }
    .cancel { color: orange; font-size: 24px; }
  </style>
</head>
<body>
  <div class="cancel">Payment cancelled</div>
  <p>You can close this window and try again.</p>
</body>
</html>"#,
    )
}

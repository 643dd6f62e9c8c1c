//! # Commands Module
//!
//! All commands the cashier and kitchen screens can send.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (request parsing, dispatch)
//! ├── table.rs    ◄─── Table administration and floor overview
//! ├── menu.rs     ◄─── Menu listing
//! ├── order.rs    ◄─── Open, edit, advance, cancel, move
//! ├── kitchen.rs  ◄─── Kitchen queue
//! ├── payment.rs  ◄─── Settlement and receipt
//! ├── report.rs   ◄─── Daily sales report
//! └── config.rs   ◄─── Configuration retrieval
//! ```
//!
//! ## Wire Format
//! One JSON object per line in, one per line out:
//! ```text
//! → {"command":"add_item","args":{"order_id":"…","menu_item_id":"…","quantity":2}}
//! ← {"ok":true,"data":{"order":{…},"items":[…]}}
//!
//! → {"command":"pay","args":{"order_id":"…","method":"cash","paid_amount":60000}}
//! ← {"ok":false,"error":{"code":"CONFLICT","message":"Order … is already paid"}}
//! ```
//! `args` may be omitted for commands without parameters.

pub mod config;
pub mod kitchen;
pub mod menu;
pub mod order;
pub mod payment;
pub mod report;
pub mod table;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// One parsed request line.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub command: String,
    #[serde(default)]
    pub args: Value,
}

/// One response line.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    fn from_result(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(data) => Response {
                ok: true,
                data: Some(data),
                error: None,
            },
            Err(error) => Response {
                ok: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

/// Handles one raw request line.
pub async fn handle_line(state: &AppState, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Unparsable request line");
            return Response::from_result(Err(ApiError::bad_request(format!(
                "Invalid request: {e}"
            ))));
        }
    };

    Response::from_result(dispatch(state, request).await)
}

/// Routes a request to its command.
pub async fn dispatch(state: &AppState, request: Request) -> Result<Value, ApiError> {
    debug!(command = %request.command, "dispatch");

    let Request { command, args } = request;
    match command.as_str() {
        "list_tables" => respond(table::list_tables(state).await),
        "create_table" => respond(table::create_table(state, parse(args)?).await),
        "update_table" => respond(table::update_table(state, parse(args)?).await),
        "set_table_availability" => {
            respond(table::set_table_availability(state, parse(args)?).await)
        }
        "delete_table" => respond(table::delete_table(state, parse(args)?).await),

        "list_menu" => respond(menu::list_menu(state, parse(args)?).await),

        "open_order" => respond(order::open_order(state, parse(args)?).await),
        "get_order" => respond(order::get_order(state, parse(args)?).await),
        "add_item" => respond(order::add_item(state, parse(args)?).await),
        "update_item" => respond(order::update_item(state, parse(args)?).await),
        "remove_item" => respond(order::remove_item(state, parse(args)?).await),
        "send_to_kitchen" => respond(order::send_to_kitchen(state, parse(args)?).await),
        "advance_order" => respond(order::advance_order(state, parse(args)?).await),
        "cancel_order" => respond(order::cancel_order(state, parse(args)?).await),
        "move_table" => respond(order::move_table(state, parse(args)?).await),

        "kitchen_queue" => respond(kitchen::kitchen_queue(state).await),

        "pay" => respond(payment::pay(state, parse(args)?).await),

        "daily_report" => respond(report::daily_report(state, parse(args)?).await),

        "get_config" => respond(config::get_config(state).await),

        other => Err(ApiError::bad_request(format!("Unknown command: {other}"))),
    }
}

/// Deserializes command arguments; a missing `args` reads as `{}`.
fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ApiError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ApiError::bad_request(format!("Invalid args: {e}")))
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Result<Value, ApiError> {
    let data = result?;
    serde_json::to_value(data).map_err(|e| {
        tracing::error!("Response serialization failed: {}", e);
        ApiError::internal("Response serialization failed")
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::AppConfig;
    use kedai_db::{Database, DbConfig, NewMenuItem};
    use serde_json::json;

    /// A café with one table, one drink and tax set to zero.
    pub(crate) async fn cafe() -> (AppState, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings().set("tax_rate", "0").await.unwrap();
        let table = db.tables().create(1, "Meja 1", 4).await.unwrap();
        let kopi = db
            .menu()
            .insert(NewMenuItem {
                category: "coffee",
                name: "Kopi Tubruk",
                description: None,
                price_cents: 25_000,
                is_available: true,
            })
            .await
            .unwrap();
        (AppState::new(db, AppConfig::default()), table.id, kopi.id)
    }

    pub(crate) async fn call(state: &AppState, line: Value) -> Value {
        serde_json::to_value(handle_line(state, &line.to_string()).await).unwrap()
    }

    #[tokio::test]
    async fn test_garbage_line_is_bad_request() {
        let (state, _, _) = cafe().await;
        let response = serde_json::to_value(handle_line(&state, "not json").await).unwrap();
        assert_eq!(response["ok"], json!(false));
        assert_eq!(response["error"]["code"], json!("BAD_REQUEST"));
        assert!(response.get("data").is_none());
    }

    #[tokio::test]
    async fn test_unknown_command_and_bad_args() {
        let (state, _, _) = cafe().await;

        let response = call(&state, json!({"command": "refund"})).await;
        assert_eq!(response["error"]["code"], json!("BAD_REQUEST"));

        let response = call(
            &state,
            json!({"command": "open_order", "args": {"staff_id": 7}}),
        )
        .await;
        assert_eq!(response["error"]["code"], json!("BAD_REQUEST"));
    }

    #[tokio::test]
    async fn test_args_may_be_omitted() {
        let (state, _, _) = cafe().await;
        let response = call(&state, json!({"command": "list_tables"})).await;
        assert_eq!(response["ok"], json!(true));
        assert_eq!(response["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_full_service_over_the_wire() {
        let (state, table_id, kopi_id) = cafe().await;

        let opened = call(
            &state,
            json!({"command": "open_order", "args": {"table_id": table_id, "staff_id": "kasir"}}),
        )
        .await;
        assert_eq!(opened["ok"], json!(true), "{opened}");
        let order_id = opened["data"]["id"].as_str().unwrap().to_string();

        let added = call(
            &state,
            json!({
                "command": "add_item",
                "args": {"order_id": order_id, "menu_item_id": kopi_id, "quantity": 2}
            }),
        )
        .await;
        assert_eq!(added["data"]["order"]["total_cents"], json!(50_000));

        let occupied = call(
            &state,
            json!({"command": "open_order", "args": {"table_id": table_id, "staff_id": "kasir"}}),
        )
        .await;
        assert_eq!(occupied["error"]["code"], json!("CONFLICT"));

        let sent = call(
            &state,
            json!({"command": "send_to_kitchen", "args": {"order_id": order_id}}),
        )
        .await;
        assert_eq!(sent["data"]["order"]["status"], json!("sent_to_kitchen"));

        let queue = call(&state, json!({"command": "kitchen_queue"})).await;
        assert_eq!(queue["data"][0]["lines"][0]["name"], json!("Kopi Tubruk"));

        let cancel = call(
            &state,
            json!({"command": "cancel_order", "args": {"order_id": order_id}}),
        )
        .await;
        assert_eq!(cancel["error"]["code"], json!("INVALID_STATE"));

        let paid = call(
            &state,
            json!({
                "command": "pay",
                "args": {"order_id": order_id, "method": "cash", "paid_amount": 60_000}
            }),
        )
        .await;
        assert_eq!(paid["ok"], json!(true), "{paid}");
        assert_eq!(paid["data"]["change_cents"], json!(10_000));

        let again = call(
            &state,
            json!({
                "command": "pay",
                "args": {"order_id": order_id, "method": "cash", "paid_amount": 60_000}
            }),
        )
        .await;
        assert_eq!(again["error"]["code"], json!("CONFLICT"));
    }
}

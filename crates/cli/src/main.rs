//! Waitline CLI - Command-line interface for the Waitline queue daemon

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "waitline")]
#[command(about = "Waitline queue CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "WAITLINE_RPC_URL", default_value = DEFAULT_RPC_URL, global = true)]
    rpc_url: String,

    /// External id of the acting user
    #[arg(long = "as", env = "WAITLINE_ACTOR", global = true)]
    actor: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the acting user (idempotent)
    Register {
        /// Full display name
        #[arg(long)]
        full_name: String,

        /// Front-end handle
        #[arg(long)]
        username: Option<String>,
    },

    /// List registered users (staff)
    Users,

    /// Grant the staff flag to a user (staff)
    Promote {
        /// External id of the user to promote
        external_id: i64,
    },

    /// List services
    Services,

    /// Add a service (staff)
    ServiceAdd {
        name: String,

        /// Duration in minutes
        #[arg(long)]
        duration: i32,

        /// Price in cents
        #[arg(long)]
        price: i64,
    },

    /// Replace a service's name, duration and price (staff)
    ServiceUpdate {
        service_id: i64,
        name: String,

        /// Duration in minutes
        #[arg(long)]
        duration: i32,

        /// Price in cents
        #[arg(long)]
        price: i64,
    },

    /// Delete a service (staff)
    ServiceDelete { service_id: i64 },

    /// Show bookable time slots
    Slots,

    /// Join the queue
    Enqueue {
        service_id: i64,

        /// Scheduled time (RFC 3339); defaults to the first offered slot
        #[arg(long)]
        at: Option<String>,
    },

    /// Show your waiting entries
    Mine,

    /// Cancel one of your entries
    Cancel { entry_id: i64 },

    /// Show the whole waiting queue (staff)
    Board,

    /// Complete or cancel an entry (staff)
    SetStatus {
        entry_id: i64,

        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Move an entry one place (staff)
    Move {
        entry_id: i64,

        #[arg(value_enum)]
        direction: DirectionArg,
    },

    /// Check that waiting positions are exactly 1..N (staff)
    Verify,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Completed,
    Cancelled,
}

impl StatusArg {
    fn as_str(self) -> &'static str {
        match self {
            StatusArg::Completed => "completed",
            StatusArg::Cancelled => "cancelled",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Up,
    Down,
}

impl DirectionArg {
    fn as_str(self) -> &'static str {
        match self {
            DirectionArg::Up => "up",
            DirectionArg::Down => "down",
        }
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct UserView {
    external_id: i64,
    username: Option<String>,
    full_name: String,
    is_staff: bool,
}

#[derive(Tabled)]
struct UserRow {
    external_id: i64,
    full_name: String,
    username: String,
    staff: String,
}

impl From<UserView> for UserRow {
    fn from(u: UserView) -> Self {
        Self {
            external_id: u.external_id,
            full_name: u.full_name,
            username: u.username.map(|n| format!("@{}", n)).unwrap_or_default(),
            staff: if u.is_staff { "yes".to_string() } else { String::new() },
        }
    }
}

#[derive(Deserialize)]
struct ServiceView {
    id: i64,
    name: String,
    duration_minutes: i32,
    price_cents: i64,
}

#[derive(Tabled)]
struct ServiceRow {
    id: i64,
    name: String,
    duration: String,
    price: String,
}

impl From<ServiceView> for ServiceRow {
    fn from(s: ServiceView) -> Self {
        Self {
            id: s.id,
            name: s.name,
            duration: format!("{} min", s.duration_minutes),
            price: format_price(s.price_cents),
        }
    }
}

#[derive(Deserialize)]
struct EntryView {
    id: i64,
    scheduled_time: i64,
    position: i64,
}

#[derive(Deserialize)]
struct ClientView {
    full_name: String,
    username: Option<String>,
}

#[derive(Deserialize)]
struct QueueItemView {
    entry: EntryView,
    service_name: String,
    duration_minutes: i32,
    price_cents: i64,
    client: Option<ClientView>,
}

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "#")]
    position: i64,
    entry: i64,
    client: String,
    service: String,
    time: String,
    price: String,
}

impl From<QueueItemView> for QueueRow {
    fn from(item: QueueItemView) -> Self {
        let client = match item.client {
            Some(c) => match c.username {
                Some(name) => format!("{} (@{})", c.full_name, name),
                None => c.full_name,
            },
            None => "-".to_string(),
        };
        Self {
            position: item.entry.position,
            entry: item.entry.id,
            client,
            service: format!("{} ({} min)", item.service_name, item.duration_minutes),
            time: format_time(item.entry.scheduled_time),
            price: format_price(item.price_cents),
        }
    }
}

#[derive(Deserialize)]
struct MutationView {
    entry_id: i64,
    applied: bool,
    reason: Option<String>,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn require_actor(actor: Option<i64>) -> Result<i64> {
    actor.ok_or_else(|| anyhow::anyhow!("This command needs --as <external id> or WAITLINE_ACTOR"))
}

fn format_price(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

fn format_time(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn parse_time(raw: &str) -> Result<i64> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid time '{}', expected RFC 3339", raw))?;
    Ok(parsed.timestamp_millis())
}

fn print_table<T: Tabled>(rows: Vec<T>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty.yellow());
    } else {
        println!("{}", Table::new(rows));
    }
}

fn print_queue(result: serde_json::Value, empty: &str) -> Result<()> {
    let items: Vec<QueueItemView> = serde_json::from_value(result["entries"].clone())?;
    print_table(items.into_iter().map(QueueRow::from).collect(), empty);
    Ok(())
}

fn print_mutation(result: serde_json::Value, verb: &str) -> Result<()> {
    let m: MutationView = serde_json::from_value(result)?;
    if m.applied {
        println!("{}", format!("✓ Entry {} {}", m.entry_id, verb).green().bold());
    } else {
        let reason = m.reason.unwrap_or_else(|| "unknown".to_string());
        println!(
            "{}",
            format!("✗ Entry {} not {}: {}", m.entry_id, verb, reason).red().bold()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();

    match cli.command {
        Commands::Register {
            full_name,
            username,
        } => {
            let external_id = require_actor(cli.actor)?;
            let params = json!({
                "external_id": external_id,
                "username": username,
                "full_name": full_name,
            });
            let result = call_rpc(url, "user.register.v1", params).await?;
            let user: UserView = serde_json::from_value(result)?;

            println!("{}", "✓ Registered".green().bold());
            println!();
            print_table(vec![UserRow::from(user)], "");
        }

        Commands::Users => {
            let params = json!({ "actor": require_actor(cli.actor)? });
            let result = call_rpc(url, "user.list.v1", params).await?;
            let users: Vec<UserView> = serde_json::from_value(result["users"].clone())?;
            print_table(
                users.into_iter().map(UserRow::from).collect(),
                "No registered users",
            );
        }

        Commands::Promote { external_id } => {
            let params = json!({
                "actor": require_actor(cli.actor)?,
                "external_id": external_id,
            });
            let result = call_rpc(url, "user.promote.v1", params).await?;
            if result["promoted"].as_bool().unwrap_or(false) {
                println!("{}", format!("✓ User {} is now staff", external_id).green().bold());
            } else {
                println!("{}", format!("User {} is not registered", external_id).yellow());
            }
        }

        Commands::Services => {
            let result = call_rpc(url, "service.list.v1", json!({})).await?;
            let services: Vec<ServiceView> = serde_json::from_value(result["services"].clone())?;
            print_table(
                services.into_iter().map(ServiceRow::from).collect(),
                "No services yet",
            );
        }

        Commands::ServiceAdd {
            name,
            duration,
            price,
        } => {
            let params = json!({
                "actor": require_actor(cli.actor)?,
                "name": name,
                "duration_minutes": duration,
                "price_cents": price,
            });
            let result = call_rpc(url, "service.create.v1", params).await?;
            println!(
                "{}",
                format!("✓ Service {} created", result["service_id"]).green().bold()
            );
        }

        Commands::ServiceUpdate {
            service_id,
            name,
            duration,
            price,
        } => {
            let params = json!({
                "actor": require_actor(cli.actor)?,
                "service_id": service_id,
                "name": name,
                "duration_minutes": duration,
                "price_cents": price,
            });
            let result = call_rpc(url, "service.update.v1", params).await?;
            if result["changed"].as_bool().unwrap_or(false) {
                println!("{}", format!("✓ Service {} updated", service_id).green().bold());
            } else {
                println!("{}", format!("Service {} not found", service_id).yellow());
            }
        }

        Commands::ServiceDelete { service_id } => {
            let params = json!({
                "actor": require_actor(cli.actor)?,
                "service_id": service_id,
            });
            let result = call_rpc(url, "service.delete.v1", params).await?;
            if result["changed"].as_bool().unwrap_or(false) {
                println!("{}", format!("✓ Service {} deleted", service_id).green().bold());
            } else {
                println!("{}", format!("Service {} not found", service_id).yellow());
            }
        }

        Commands::Slots => {
            let result = call_rpc(url, "slots.list.v1", json!({})).await?;
            let slots: Vec<i64> = serde_json::from_value(result["slots"].clone())?;
            println!("{}", "Available slots".cyan().bold());
            for slot in slots {
                println!("  {}", format_time(slot));
            }
        }

        Commands::Enqueue { service_id, at } => {
            let actor = require_actor(cli.actor)?;
            let scheduled_time = match at {
                Some(raw) => parse_time(&raw)?,
                None => {
                    let result = call_rpc(url, "slots.list.v1", json!({})).await?;
                    result["slots"][0]
                        .as_i64()
                        .ok_or_else(|| anyhow::anyhow!("No slots offered"))?
                }
            };

            let params = json!({
                "actor": actor,
                "service_id": service_id,
                "scheduled_time": scheduled_time,
            });
            let result = call_rpc(url, "queue.enqueue.v1", params).await?;

            println!("{}", "✓ Joined the queue".green().bold());
            println!("  {} {}", "Entry:".bold(), result["entry_id"]);
            println!("  {} {}", "Position:".bold(), result["position"]);
            println!("  {} {}", "Time:".bold(), format_time(scheduled_time));
        }

        Commands::Mine => {
            let params = json!({ "actor": require_actor(cli.actor)? });
            let result = call_rpc(url, "queue.mine.v1", params).await?;
            print_queue(result, "You are not in the queue")?;
        }

        Commands::Cancel { entry_id } => {
            let params = json!({
                "actor": require_actor(cli.actor)?,
                "entry_id": entry_id,
            });
            let result = call_rpc(url, "queue.cancel.v1", params).await?;
            print_mutation(result, "cancelled")?;
        }

        Commands::Board => {
            let params = json!({ "actor": require_actor(cli.actor)? });
            let result = call_rpc(url, "queue.board.v1", params).await?;
            print_queue(result, "The queue is empty")?;
        }

        Commands::SetStatus { entry_id, status } => {
            let params = json!({
                "actor": require_actor(cli.actor)?,
                "entry_id": entry_id,
                "status": status.as_str(),
            });
            let result = call_rpc(url, "queue.set_status.v1", params).await?;
            print_mutation(result, status.as_str())?;
        }

        Commands::Move {
            entry_id,
            direction,
        } => {
            let params = json!({
                "actor": require_actor(cli.actor)?,
                "entry_id": entry_id,
                "direction": direction.as_str(),
            });
            let result = call_rpc(url, "queue.move.v1", params).await?;
            print_mutation(result, &format!("moved {}", direction.as_str()))?;
        }

        Commands::Verify => {
            let params = json!({ "actor": require_actor(cli.actor)? });
            match call_rpc(url, "queue.verify.v1", params).await {
                Ok(report) => {
                    println!("{}", "✓ Queue positions are contiguous".green().bold());
                    println!("  {} {}", "Waiting:".bold(), report["waiting"]);
                    println!("  {} {}", "Completed:".bold(), report["completed"]);
                    println!("  {} {}", "Cancelled:".bold(), report["cancelled"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "FAULT".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(2500), "25.00");
        assert_eq!(format_price(1999), "19.99");
        assert_eq!(format_price(5), "0.05");
    }

    #[test]
    fn test_parse_time_round_trips_display() {
        let millis = parse_time("2026-03-10T09:00:00Z").unwrap();
        assert_eq!(format_time(millis), "10.03.2026 09:00");
        assert!(parse_time("tomorrow").is_err());
    }

    #[test]
    fn test_cli_parses_global_actor() {
        let cli = Cli::try_parse_from(["waitline", "move", "5", "up", "--as", "42"]).unwrap();
        assert_eq!(cli.actor, Some(42));
        assert!(matches!(
            cli.command,
            Commands::Move {
                entry_id: 5,
                direction: DirectionArg::Up
            }
        ));
    }
}

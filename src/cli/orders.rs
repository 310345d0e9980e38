use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Subcommand;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::debug;

use crate::app_system::AdminSystem;
use crate::composer::{DraftEdit, OrderDraft};
use crate::config::AdminConfig;
use crate::domain::{Amount, LineItem, Order, OrderFilter, OrderStatus};
use crate::totals::line_total_input;

#[derive(Debug, Subcommand)]
pub(crate) enum OrderCommand {
    /// List orders, optionally limited to a creation-date window
    List {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<Date>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<Date>,
    },
    /// Show one order with its line items
    Show { id: String },
    /// Create an order for an existing user
    Create {
        /// Id of the ordering user
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = OrderStatus::Pending)]
        status: OrderStatus,
        /// Line item as NAME:PRICE:QTY or NAME:PRICE:QTY:IMAGE_PATH
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<ItemSpec>,
    },
    /// Replace the line items (and optionally the status) of an order
    Update {
        id: String,
        #[arg(long)]
        status: Option<OrderStatus>,
        /// Line item as NAME:PRICE:QTY or NAME:PRICE:QTY:IMAGE_PATH
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<ItemSpec>,
    },
    /// Change the status of an order
    Status { id: String, status: OrderStatus },
    /// Delete an order
    Delete { id: String },
}

/// One `--item` argument, still as typed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ItemSpec {
    pub(crate) name: String,
    pub(crate) price: String,
    pub(crate) quantity: String,
    pub(crate) image: Option<PathBuf>,
}

fn parse_item(raw: &str) -> Result<ItemSpec, String> {
    let mut parts = raw.splitn(4, ':');
    let name = parts.next().unwrap_or_default().trim();
    let (Some(price), Some(quantity)) = (parts.next(), parts.next()) else {
        return Err(format!("expected NAME:PRICE:QTY[:IMAGE], got {raw:?}"));
    };
    if name.is_empty() {
        return Err("item name must not be empty".to_string());
    }
    let image = parts
        .next()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from);

    Ok(ItemSpec {
        name: name.to_string(),
        price: price.to_string(),
        quantity: quantity.to_string(),
        image,
    })
}

fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn data_uri(path: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type(path), STANDARD.encode(bytes))
}

async fn build_draft(
    user: String,
    status: OrderStatus,
    items: Vec<ItemSpec>,
    config: &AdminConfig,
) -> Result<OrderDraft, String> {
    let allocator = config.allocator();
    let draft = OrderDraft::new()
        .apply(DraftEdit::SelectUser(Some(user)), &allocator)
        .apply(DraftEdit::SetStatus(status), &allocator);
    add_items(draft, items, config).await
}

/// Starts from the stored order and swaps its items for `items`.
async fn rework_draft(
    order: &Order,
    status: Option<OrderStatus>,
    items: Vec<ItemSpec>,
    config: &AdminConfig,
) -> Result<OrderDraft, String> {
    let allocator = config.allocator();
    let mut draft = OrderDraft::from_order(order);
    let keys: Vec<_> = draft.items().iter().map(|item| item.key).collect();
    for key in keys {
        draft = draft.apply(DraftEdit::RemoveItem(key), &allocator);
    }
    if let Some(status) = status {
        draft = draft.apply(DraftEdit::SetStatus(status), &allocator);
    }
    add_items(draft, items, config).await
}

async fn add_items(
    mut draft: OrderDraft,
    items: Vec<ItemSpec>,
    config: &AdminConfig,
) -> Result<OrderDraft, String> {
    let allocator = config.allocator();
    for item in items {
        let image = match &item.image {
            Some(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| format!("Cannot read image {}: {e}", path.display()))?;
                debug!(path = %path.display(), size = bytes.len(), "Embedding item image");
                Some(data_uri(path, &bytes))
            }
            None => None,
        };

        draft = draft.apply(DraftEdit::AddItem, &allocator);
        let Some(key) = draft.last_key() else {
            return Err("Line item could not be added".to_string());
        };
        draft = draft
            .apply(DraftEdit::Rename(key, item.name), &allocator)
            .apply(DraftEdit::SetUnitPrice(key, item.price), &allocator)
            .apply(DraftEdit::SetQuantity(key, item.quantity), &allocator)
            .apply(DraftEdit::SetImage(key, image), &allocator);
    }
    Ok(draft)
}

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Order No")]
    order_number: String,
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Total")]
    total: Amount,
}

impl OrderRow {
    fn new(order: &Order, tz: &TimeZone) -> Self {
        Self {
            id: order.id.clone(),
            order_number: order.order_number.clone(),
            user_id: order.user_id.clone(),
            status: order.status.label(),
            created: order
                .created_at
                .to_zoned(tz.clone())
                .strftime("%Y-%m-%d %H:%M")
                .to_string(),
            items: order.items.len(),
            total: order.total_price,
        }
    }
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Price")]
    unit_price: Amount,
    #[tabled(rename = "Qty")]
    quantity: Amount,
    #[tabled(rename = "Total")]
    total: Amount,
    #[tabled(rename = "Image")]
    image: &'static str,
}

impl From<&LineItem> for ItemRow {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            total: item.total,
            image: if item.image.is_some() { "yes" } else { "" },
        }
    }
}

#[derive(Tabled)]
struct PreviewRow {
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Line total")]
    total: Amount,
}

/// Line totals for the items as typed, before anything is sent.
fn preview(items: &[ItemSpec]) -> Table {
    let rows = items.iter().map(|item| PreviewRow {
        name: item.name.clone(),
        price: item.price.clone(),
        quantity: item.quantity.clone(),
        total: line_total_input(&item.price, &item.quantity),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table
}

fn draft_summary(draft: &OrderDraft) -> String {
    format!(
        "Order for user {} ({}), {} item(s), total {}",
        draft.user_id().unwrap_or("-"),
        draft.status().label(),
        draft.items().len(),
        draft.total_price()
    )
}

fn order_table(orders: &[Order], tz: &TimeZone) -> Table {
    let mut table = Table::new(orders.iter().map(|order| OrderRow::new(order, tz)));
    table.with(Style::rounded());
    table
}

pub(crate) async fn run(
    command: OrderCommand,
    config: &AdminConfig,
    system: &AdminSystem,
) -> Result<(), String> {
    let orders = &system.order_client;
    let tz = TimeZone::system();
    match command {
        OrderCommand::List { from, to } => {
            let filter = OrderFilter::between(from, to);
            let list = orders
                .list_orders_filtered(filter, &tz)
                .await
                .map_err(|e| e.to_string())?;
            if list.is_empty() {
                println!("No orders.");
                return Ok(());
            }
            println!("{}", order_table(&list, &tz));
        }
        OrderCommand::Show { id } => {
            let order = orders
                .get_order(id.clone())
                .await
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("Order not found: {id}"))?;
            println!("{}", order_table(std::slice::from_ref(&order), &tz));
            let mut items = Table::new(order.items.iter().map(ItemRow::from));
            items.with(Style::rounded());
            println!("{items}");
        }
        OrderCommand::Create {
            user,
            status,
            items,
        } => {
            println!("{}", preview(&items));
            let draft = build_draft(user, status, items, config).await?;
            println!("{}", draft_summary(&draft));
            let order = orders
                .create_order(&draft)
                .await
                .map_err(|e| e.to_string())?;
            println!(
                "Created order {} ({}) total {}",
                order.id, order.order_number, order.total_price
            );
        }
        OrderCommand::Update { id, status, items } => {
            let current = orders
                .get_order(id.clone())
                .await
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("Order not found: {id}"))?;
            println!("{}", preview(&items));
            let draft = rework_draft(&current, status, items, config).await?;
            println!("{}", draft_summary(&draft));
            let order = orders
                .update_order(id, &draft)
                .await
                .map_err(|e| e.to_string())?;
            println!(
                "Updated order {} ({}) total {}",
                order.id, order.order_number, order.total_price
            );
        }
        OrderCommand::Status { id, status } => {
            let order = orders
                .set_status(id, status)
                .await
                .map_err(|e| e.to_string())?;
            println!("Order {} is now {}", order.id, order.status.label());
        }
        OrderCommand::Delete { id } => {
            orders.delete_order(id.clone()).await.map_err(|e| e.to_string())?;
            println!("Deleted order {id}");
        }
    }
    Ok(())
}

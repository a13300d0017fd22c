use crate::error::Error;
use crate::supabase::rest::{self, Authority};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Row in the `gear_types` table (e.g. wetsuit, fins), with the sponsor who
/// donated it.
#[derive(Debug, Deserialize, Clone)]
pub struct GearType {
    pub id: String,
    pub name: String,
    pub sponsor_name: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewGearType {
    pub name: String,
    pub sponsor_name: Option<String>,
    pub description: Option<String>,
}

/// Row in the `gear_inventory` table: stock of one gear type in one size.
#[derive(Debug, Deserialize, Clone)]
pub struct GearInventory {
    pub id: String,
    pub gear_type_id: String,
    pub size: Option<String>,
    pub quantity_total: u32,
    pub quantity_available: u32,
    pub notes: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewGearInventory {
    pub gear_type_id: String,
    pub size: Option<String>,
    pub quantity_total: u32,
    pub quantity_available: u32,
    pub notes: Option<String>,
}

/// Row in the `gear_assignments` table: one inventory item handed to one
/// participant.
#[derive(Debug, Deserialize, Clone)]
pub struct GearAssignment {
    pub id: String,
    pub participant_id: String,
    pub gear_inventory_id: String,
    pub assigned_by_user_id: Option<String>,
    pub assigned_date: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
}

pub async fn gear_types() -> Result<Vec<GearType>, Error> {
    rest::select(
        "gear_types",
        &[("select", "*"), ("order", "name.asc")],
        Authority::CallerSession,
    )
    .await
}

pub async fn inventory() -> Result<Vec<GearInventory>, Error> {
    rest::select(
        "gear_inventory",
        &[("select", "*"), ("order", "created_at.desc")],
        Authority::CallerSession,
    )
    .await
}

pub async fn assignments() -> Result<Vec<GearAssignment>, Error> {
    rest::select(
        "gear_assignments",
        &[("select", "*"), ("order", "assigned_date.desc")],
        Authority::CallerSession,
    )
    .await
}

pub async fn create_gear_type(gear_type: &NewGearType) -> Result<(), Error> {
    rest::insert("gear_types", gear_type, Authority::CallerSession).await
}

pub async fn create_inventory(item: &NewGearInventory) -> Result<(), Error> {
    rest::insert("gear_inventory", item, Authority::CallerSession).await
}

pub async fn update_inventory(inventory_id: &str, item: &NewGearInventory) -> Result<(), Error> {
    let filter = format!("eq.{inventory_id}");
    rest::update(
        "gear_inventory",
        item,
        &[("id", filter.as_str())],
        Authority::CallerSession,
    )
    .await
}

async fn set_quantity_available(inventory_id: &str, quantity: u32) -> Result<(), Error> {
    let filter = format!("eq.{inventory_id}");
    rest::update(
        "gear_inventory",
        &json!({ "quantity_available": quantity }),
        &[("id", filter.as_str())],
        Authority::CallerSession,
    )
    .await
}

/// Hands an inventory item to a participant and decrements the available
/// quantity. The two writes are separate backend calls; the quantity update
/// follows the assignment insert as in the console forms.
pub async fn assign_gear(
    participant_id: &str,
    inventory_id: &str,
    assigned_by_user_id: &str,
    assigned_date: &str,
    notes: Option<&str>,
) -> Result<(), Error> {
    let filter = format!("eq.{inventory_id}");
    let item = rest::select_maybe_single::<GearInventory>(
        "gear_inventory",
        &[("select", "*"), ("id", filter.as_str())],
        Authority::CallerSession,
    )
    .await?
    .ok_or(Error::Backend("gear item not found".to_string()))?;
    if item.quantity_available == 0 {
        return Err(Error::Backend("no items of this gear available".to_string()));
    }
    rest::insert(
        "gear_assignments",
        &json!({
            "participant_id": participant_id,
            "gear_inventory_id": inventory_id,
            "assigned_by_user_id": assigned_by_user_id,
            "assigned_date": assigned_date,
            "notes": notes,
        }),
        Authority::CallerSession,
    )
    .await?;
    set_quantity_available(inventory_id, item.quantity_available - 1).await
}

/// Takes an assignment back and returns the item to stock.
pub async fn return_gear(assignment: &GearAssignment) -> Result<(), Error> {
    let filter = format!("eq.{}", assignment.id);
    rest::delete(
        "gear_assignments",
        &[("id", filter.as_str())],
        Authority::CallerSession,
    )
    .await?;
    let inventory_filter = format!("eq.{}", assignment.gear_inventory_id);
    let item = rest::select_maybe_single::<GearInventory>(
        "gear_inventory",
        &[("select", "*"), ("id", inventory_filter.as_str())],
        Authority::CallerSession,
    )
    .await?;
    if let Some(item) = item {
        let quantity = item.quantity_available + 1;
        if quantity <= item.quantity_total {
            set_quantity_available(&item.id, quantity).await?;
        }
    }
    Ok(())
}

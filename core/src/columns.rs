//! Default printer columns per role.

use crate::{PrinterColumn, ResourceRole};

const READY_PATH: &str = ".status.conditions[?(@.type=='Ready')].status";
const SYNCED_PATH: &str = ".status.conditions[?(@.type=='Synced')].status";

/// Returns the default printer columns for a role, in display order.
///
/// Both roles start with `READY` and `SYNCED`. Composite resources add
/// `COMPOSITION`; claims add `CONNECTION-SECRET`.
///
/// # Examples
///
/// ```
/// use composite_schema_core::{printer_columns, ResourceRole};
///
/// let names: Vec<String> = printer_columns(ResourceRole::Claim)
///     .into_iter()
///     .map(|c| c.name)
///     .collect();
/// assert_eq!(names, ["READY", "SYNCED", "CONNECTION-SECRET"]);
/// ```
pub fn printer_columns(role: ResourceRole) -> Vec<PrinterColumn> {
    let mut columns = vec![
        PrinterColumn::string("READY", READY_PATH),
        PrinterColumn::string("SYNCED", SYNCED_PATH),
    ];
    columns.push(match role {
        ResourceRole::CompositeResource => {
            PrinterColumn::string("COMPOSITION", ".spec.compositionRef.name")
        }
        ResourceRole::Claim => {
            PrinterColumn::string("CONNECTION-SECRET", ".spec.writeConnectionSecretToRef.name")
        }
    });
    columns
}

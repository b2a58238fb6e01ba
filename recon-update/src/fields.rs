//! Updatable record fields
//!
//! Spreadsheet headers use the display names; the record API receives the
//! API field names.

use recon_common::{static_catalog, Error, Result};

static_catalog! {
    /// Record fields the update tool can write
    pub enum RecordField {
        AccessoryLastAnnualPm => ("Accessory Last Annual PM", "accessory_last_annual_pm_api_field"),
        AccessoryNextAnnualPm => ("Accessory Next Annual PM", "accessory_next_annual_pm_api_field"),
        AccessoryLastPm => ("Accessory Last PM", "accessory_last_pm_api_field"),
        AccessoryNextPm => ("Accessory Next PM", "accessory_next_pm_api_field"),
        ChassisLastAnnualPm => ("Chassis Last Annual PM", "chassis_last_annual_pm_api_field"),
        ChassisNextAnnualPmDueDate => ("Chassis Next Annual PM Due Date", "chassis_next_annual_pm_due_date_api_field"),
        ChassisLastPm => ("Chassis Last PM", "chassis_last_pm_api_field"),
        ChassisNextPmDueDate => ("Chassis Next PM Due Date", "chassis_next_pm_due_date_api_field"),
        Color => ("Color", "color_api_field"),
        EngineDisplacement => ("Engine Displacement", "engine_displacement_api_field"),
        EngineFamilyName => ("Engine Family Name", "engine_family_name_api_field"),
        EngineMake => ("Engine Make", "engine_make_api_field"),
        EngineModel => ("Engine Model", "engine_model_api_field"),
        EngineNotificationValue => ("Engine Notification Value", "engine_notification_value_api_field"),
        EngineSerialNum => ("Engine Serial #", "engine_serial_num_api_field"),
        EngineYear => ("Engine Year", "engine_year_api_field"),
        GeotabId => ("GeoTab ID", "geotab_id_api_field"),
        CameraImei => ("Camera IMEI", "camera_imei_api_field"),
        GeotabSerialNumber => ("Geotab Serial Number", "geotab_serial_number_api_field"),
        Gvw => ("GVW", "gvw_api_field"),
        LicenseExp => ("License Exp", "license_exp_api_field"),
        LicenseExpiration => ("License Expiration", "license_expiration_api_field"),
        LicensePlate => ("License Plate", "license_plate_api_field"),
        LicenseState => ("License State", "license_state_api_field"),
        LicenseType => ("License Type", "license_type_api_field"),
        Title => ("Title", "title_api_field"),
        TollTagNum => ("Toll Tag #", "toll_tag_num_api_field"),
        TollTagEffectiveDate => ("Toll Tag Effective Date", "toll_tag_effective_date_api_field"),
        TollTagExpiration => ("Toll Tag Expiration", "toll_tag_expiration_api_field"),
    }
}

/// Identifier column every update sheet carries
pub const RECORD_ID_COLUMN: &str = "equipment_id";

/// Numbered menu lines, `"1. Accessory Last Annual PM"`
pub fn menu() -> Vec<String> {
    RecordField::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{}. {}", i + 1, field.display_name()))
        .collect()
}

/// Parse a `1,3,5` selection
///
/// Non-numeric tokens are ignored; out-of-range numbers and an empty result
/// are errors. Repeats keep their first position.
pub fn select_by_numbers(selection: &str) -> Result<Vec<RecordField>> {
    let mut fields = Vec::new();
    for token in selection.split(',').map(str::trim) {
        let Ok(number) = token.parse::<usize>() else {
            continue;
        };
        let field = RecordField::from_number(number).ok_or_else(|| {
            Error::Input(format!(
                "invalid field number {} (choose 1-{})",
                number,
                RecordField::ALL.len()
            ))
        })?;
        push_unique(&mut fields, field);
    }
    non_empty(fields)
}

/// Resolve display names, case-insensitively
pub fn select_by_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<RecordField>> {
    let mut fields = Vec::new();
    for name in names {
        let field = name.as_ref().parse::<RecordField>().map_err(Error::Input)?;
        push_unique(&mut fields, field);
    }
    non_empty(fields)
}

/// Column headers for a sheet updating `fields`
pub fn headers(fields: &[RecordField]) -> Vec<String> {
    std::iter::once(RECORD_ID_COLUMN.to_string())
        .chain(fields.iter().map(|f| f.display_name().to_string()))
        .collect()
}

fn push_unique(fields: &mut Vec<RecordField>, field: RecordField) {
    if !fields.contains(&field) {
        fields.push(field);
    }
}

fn non_empty(fields: Vec<RecordField>) -> Result<Vec<RecordField>> {
    if fields.is_empty() {
        return Err(Error::Input("no valid fields selected".to_string()));
    }
    Ok(fields)
}

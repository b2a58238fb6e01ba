//! Upload form choices

use recon_common::static_catalog;

static_catalog! {
    /// Portal field that receives the mapped FinalName
    pub enum TargetField {
        EquipmentIdentifier => ("Equipment Identifier", "EQUIPMENT_ID_API_FIELD"),
        PurchaseRequestId => ("Purchase Request ID", "PURCHASE_REQ_ID_API_FIELD"),
        RequestDetailsId => ("Request Details ID", "REQ_DETAILS_ID_API_FIELD"),
        OrderNumber => ("Order Number", "ORDER_NUM_API_FIELD"),
    }
}

static_catalog! {
    /// Document type code attached to every upload
    pub enum DocumentType {
        Approval => ("Approval Document", "DOC_TYPE_APPROVAL"),
        BillOfLading => ("Bill Of Lading", "DOC_TYPE_BOL"),
        Campaign => ("Campaign Document", "DOC_TYPE_CAMPAIGN"),
        CapexApproval => ("Capex Approval", "DOC_TYPE_CAPEX_APPROVAL"),
        Insurance => ("Insurance Policy", "DOC_TYPE_INSURANCE"),
        LeaseAgreement => ("Lease Agreement", "DOC_TYPE_LEASE_AGREEMENT"),
        Maintenance => ("Maintenance Record", "DOC_TYPE_MAINTENANCE"),
        Permit => ("Permit Document", "DOC_TYPE_PERMIT"),
        PmInvoice => ("PM Invoice", "DOC_TYPE_PM_INVOICE"),
        Recall => ("Recall Notice", "DOC_TYPE_RECALL"),
        Registration => ("Registration Document", "DOC_TYPE_REGISTRATION"),
        RentalAgreement => ("Rental Agreement", "DOC_TYPE_RENTAL_AGREEMENT"),
        RepairEstimate => ("Repair Estimate", "DOC_TYPE_REPAIR_ESTIMATE"),
        RepairInvoice => ("Repair Invoice", "DOC_TYPE_REPAIR_INVOICE"),
        Sales => ("Sales Document", "DOC_TYPE_SALES"),
        Title => ("Title Document", "DOC_TYPE_TITLE"),
        Warranty => ("Warranty Document", "DOC_TYPE_WARRANTY"),
    }
}

/// Staging folder extensions picked up for upload
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "jfif", "svg", "txt", "csv", "xls", "xlsx",
];

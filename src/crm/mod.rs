// CRM Record Source - pull objects out of the hosted CRM
//
// - source:  paging contract (PageSource) + pagination loop
// - flatten: nested objects -> flat rows for the tabular sink
// - hubspot: HTTP implementation of PageSource (feature "hubspot")

pub mod error;
pub mod flatten;
pub mod source;

#[cfg(feature = "hubspot")]
pub mod hubspot;

pub use error::SourceError;
pub use flatten::{extract_all, flatten, flatten_all, FlatRecord};
pub use source::{
    get_all_records, AssociatedId, AssociationList, CrmObject, ExtractionPlan, ObjectType, Page,
    PageSource, PagedRecords,
};

#[cfg(feature = "hubspot")]
pub use hubspot::HubSpotClient;

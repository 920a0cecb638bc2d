// 📥 CRM Record Source - paginated object listing
//
// A PageSource hands out one page at a time given a cursor; the page says
// whether there is a next cursor. get_all_records loops until there isn't.

use super::error::SourceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

// ============================================================================
// OBJECT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Contacts,
    Companies,
    Deals,
}

impl ObjectType {
    pub const ALL: [ObjectType; 3] = [ObjectType::Contacts, ObjectType::Companies, ObjectType::Deals];

    /// Path segment and table name
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Contacts => "contacts",
            ObjectType::Companies => "companies",
            ObjectType::Deals => "deals",
        }
    }

    /// Properties pulled by default for this object type
    pub fn default_properties(&self) -> &'static [&'static str] {
        match self {
            ObjectType::Contacts => &[
                "email",
                "firstname",
                "lastname",
                "createdate",
                "lifecyclestage",
                "hs_object_id",
            ],
            ObjectType::Companies => &["domain", "name", "createdate", "industry", "hs_object_id"],
            ObjectType::Deals => &[
                "dealname",
                "amount",
                "closedate",
                "createdate",
                "pipeline",
                "dealstage",
                "hs_object_id",
            ],
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contacts" => Ok(ObjectType::Contacts),
            "companies" => Ok(ObjectType::Companies),
            "deals" => Ok(ObjectType::Deals),
            other => Err(SourceError::UnknownObjectType(other.to_string())),
        }
    }
}

// ============================================================================
// CRM OBJECTS AND PAGES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociatedId {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociationList {
    #[serde(default)]
    pub results: Vec<AssociatedId>,
}

/// One CRM record as the API returns it (nested)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmObject {
    pub id: String,

    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub archived: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub associations: BTreeMap<String, AssociationList>,
}

/// One page of results plus the cursor for the next one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub results: Vec<CrmObject>,
    pub next_after: Option<String>,
}

impl Page {
    /// None = last page
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_after.as_deref().filter(|after| !after.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct WireNext {
    after: String,
}

#[derive(Debug, Deserialize)]
struct WirePaging {
    next: Option<WireNext>,
}

/// List-endpoint response body: `{"results": [...], "paging": {"next": {"after": ".."}}}`
#[derive(Debug, Deserialize)]
pub struct WirePage {
    #[serde(default)]
    results: Vec<CrmObject>,
    paging: Option<WirePaging>,
}

impl From<WirePage> for Page {
    fn from(wire: WirePage) -> Self {
        Page {
            results: wire.results,
            next_after: wire.paging.and_then(|p| p.next).map(|n| n.after),
        }
    }
}

impl Page {
    pub fn from_json(body: &str) -> Result<Self, SourceError> {
        serde_json::from_str::<WirePage>(body)
            .map(Page::from)
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

// ============================================================================
// PAGE SOURCE
// ============================================================================

pub trait PageSource {
    /// Fetch the page that starts at `after` (None = first page)
    fn fetch_page(
        &self,
        object: ObjectType,
        properties: &[String],
        associations: &[ObjectType],
        after: Option<&str>,
    ) -> Result<Page, SourceError>;
}

/// What to pull for one object type
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionPlan {
    pub object: ObjectType,
    pub properties: Vec<String>,
    pub associations: Vec<ObjectType>,
}

impl ExtractionPlan {
    pub fn for_object(object: ObjectType) -> Self {
        ExtractionPlan {
            object,
            properties: object
                .default_properties()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            associations: Vec::new(),
        }
    }

    pub fn with_associations(mut self, associations: &[ObjectType]) -> Self {
        self.associations = associations.to_vec();
        self
    }

    /// Contacts, companies and deals with their default properties
    pub fn defaults() -> Vec<ExtractionPlan> {
        ObjectType::ALL.iter().map(|o| Self::for_object(*o)).collect()
    }
}

/// All records of one object type; `halted_by` is set when an upstream
/// error stopped pagination early (records holds what came before it)
#[derive(Debug, Clone, Default)]
pub struct PagedRecords {
    pub records: Vec<CrmObject>,
    pub pages: usize,
    pub halted_by: Option<SourceError>,
}

impl PagedRecords {
    pub fn is_complete(&self) -> bool {
        self.halted_by.is_none()
    }
}

/// Follow cursors until the source reports no next page
pub fn get_all_records<S: PageSource + ?Sized>(source: &S, plan: &ExtractionPlan) -> PagedRecords {
    let mut out = PagedRecords::default();
    let mut after: Option<String> = None;

    loop {
        match source.fetch_page(plan.object, &plan.properties, &plan.associations, after.as_deref()) {
            Ok(page) => {
                out.pages += 1;
                debug!(object = %plan.object, page = out.pages, results = page.results.len(), "page fetched");

                let next = page.next_cursor().map(str::to_string);
                out.records.extend(page.results);

                match next {
                    Some(cursor) => after = Some(cursor),
                    None => break,
                }
            }
            Err(e) => {
                warn!(object = %plan.object, error = %e, kept = out.records.len(), "pagination halted");
                out.halted_by = Some(e);
                break;
            }
        }
    }

    info!(object = %plan.object, records = out.records.len(), pages = out.pages, "extraction finished");
    out
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Candidates,
    Openings,
}

impl Domain {
    pub fn name(&self) -> &'static str {
        match self {
            Domain::Candidates => "candidates",
            Domain::Openings => "openings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Candidates => "Candidates",
            Domain::Openings => "Job Openings",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkillMatchMode {
    #[default]
    #[serde(rename = "ANY")]
    Any,
    #[serde(rename = "ALL")]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Current page, page size and sort criteria for one domain. Pure
/// bookkeeping; issuing the actual search is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            sort_by: "createdAt".to_string(),
            sort_direction: SortDirection::Desc,
        }
    }
}

/// A filter field set that knows how many of its fields are active.
/// Arrays count when non-empty, scalars when set; the skill match mode
/// is a modifier on the skills filter, not a criterion of its own.
pub trait FilterSet: Clone + Default + PartialEq {
    fn active_count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateFilters {
    pub text_query: String,
    pub primary_skills: Vec<String>,
    pub skill_match_mode: SkillMatchMode,
    pub secondary_skills: Vec<String>,
    pub min_experience: Option<u32>,
    pub max_experience: Option<u32>,
    pub min_current_package: Option<f64>,
    pub max_current_package: Option<f64>,
    #[serde(rename = "minExpectedCTC")]
    pub min_expected_ctc: Option<f64>,
    #[serde(rename = "maxExpectedCTC")]
    pub max_expected_ctc: Option<f64>,
    pub locations: Vec<String>,
    pub statuses: Vec<String>,
    pub sources: Vec<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl FilterSet for CandidateFilters {
    fn active_count(&self) -> usize {
        let mut count = 0;
        if !self.text_query.trim().is_empty() {
            count += 1;
        }
        for list in [
            &self.primary_skills,
            &self.secondary_skills,
            &self.locations,
            &self.statuses,
            &self.sources,
        ] {
            if !list.is_empty() {
                count += 1;
            }
        }
        count += self.min_experience.is_some() as usize;
        count += self.max_experience.is_some() as usize;
        count += self.min_current_package.is_some() as usize;
        count += self.max_current_package.is_some() as usize;
        count += self.min_expected_ctc.is_some() as usize;
        count += self.max_expected_ctc.is_some() as usize;
        count += self.created_from.is_some() as usize;
        count += self.created_to.is_some() as usize;
        count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpeningFilters {
    pub text_query: String,
    pub departments: Vec<String>,
    pub types: Vec<String>,
    pub locations: Vec<String>,
    pub skills: Vec<String>,
    pub min_experience: Option<u32>,
    pub max_experience: Option<u32>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub statuses: Vec<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl FilterSet for OpeningFilters {
    fn active_count(&self) -> usize {
        let mut count = 0;
        if !self.text_query.trim().is_empty() {
            count += 1;
        }
        for list in [
            &self.departments,
            &self.types,
            &self.locations,
            &self.skills,
            &self.statuses,
        ] {
            if !list.is_empty() {
                count += 1;
            }
        }
        count += self.min_experience.is_some() as usize;
        count += self.max_experience.is_some() as usize;
        count += self.min_salary.is_some() as usize;
        count += self.max_salary.is_some() as usize;
        count += self.created_from.is_some() as usize;
        count += self.created_to.is_some() as usize;
        count
    }
}

/// One page of search results as the backend reports it. Pagination
/// accounting (`totalPages`, `first`, `last`, `empty`) is trusted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
    #[serde(default)]
    pub search_time_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub current_package: Option<String>,
    #[serde(rename = "expectedCTC")]
    pub expected_ctc: Option<String>,
    pub skills: Option<String>, // comma-separated
    #[serde(alias = "location")]
    pub current_location: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub created_at: Option<String>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Opening {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub department: Option<String>,
    #[serde(rename = "type")]
    pub opening_type: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "experienceRequired")]
    pub experience: Option<String>,
    pub min_salary: Option<String>,
    pub max_salary: Option<String>,
    pub skills: Option<String>, // comma-separated
    pub status: Option<String>,
    pub created_at: Option<String>,
}

impl Opening {
    pub fn salary_range(&self) -> String {
        match (self.min_salary.as_deref(), self.max_salary.as_deref()) {
            (Some(min), Some(max)) => format!("{} - {}", min, max),
            (Some(min), None) => format!("{}+", min),
            (None, Some(max)) => format!("up to {}", max),
            (None, None) => String::new(),
        }
    }
}

/// A named snapshot of one domain's filters. The snapshot is a copy:
/// editing the live filters after saving never touches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch<F> {
    pub id: i64,
    pub name: String,
    pub filters: F,
    pub saved_at: DateTime<Utc>,
}

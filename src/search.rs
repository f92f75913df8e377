use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::SearchError;
use crate::models::{
    Candidate, CandidateFilters, Domain, FilterSet, Opening, OpeningFilters, PageRequest,
    SearchResult, SkillMatchMode, SortDirection,
};

/// Everything the generic search pipeline needs to know about one search
/// domain: its filter shape, its result rows, where its requests go and how
/// its filters map onto the backend's request DTO.
pub trait SearchDomain {
    type Filters: FilterSet + Serialize + DeserializeOwned;
    type Row: DeserializeOwned + Clone;
    type Body: Serialize;

    const DOMAIN: Domain;
    const ENDPOINT: &'static str;
    const STORAGE_KEY: &'static str;

    fn request_body(filters: &Self::Filters, page: &PageRequest) -> Self::Body;
}

pub struct CandidateDomain;
pub struct OpeningDomain;

fn opt_text(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// The backend DTOs declare numeric range fields as strings, so numbers are
// stringified at this boundary and nowhere else.
fn stringify<T: ToString>(value: &Option<T>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

/// Wire shape of `POST /api/candidates/advanced-search`. Inactive filters
/// are omitted entirely; an empty string or empty array must never reach
/// the backend as if it were a real criterion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSearchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    text_query: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    primary_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_skills_match_type: Option<SkillMatchMode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    secondary_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_current_package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_current_package: Option<String>,
    #[serde(rename = "minExpectedCTC", skip_serializing_if = "Option::is_none")]
    min_expected_ctc: Option<String>,
    #[serde(rename = "maxExpectedCTC", skip_serializing_if = "Option::is_none")]
    max_expected_ctc: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    locations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    statuses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_to: Option<NaiveDate>,
    page: u32,
    size: u32,
    sort_by: String,
    sort_direction: SortDirection,
}

impl SearchDomain for CandidateDomain {
    type Filters = CandidateFilters;
    type Row = Candidate;
    type Body = CandidateSearchBody;

    const DOMAIN: Domain = Domain::Candidates;
    const ENDPOINT: &'static str = "/api/candidates/advanced-search";
    const STORAGE_KEY: &'static str = "candidate_saved_searches";

    fn request_body(filters: &Self::Filters, page: &PageRequest) -> Self::Body {
        // `skill_match_mode` travels as `primarySkillsMatchType`, and only
        // when there are primary skills for it to qualify.
        let match_type = if filters.primary_skills.is_empty() {
            None
        } else {
            Some(filters.skill_match_mode)
        };

        CandidateSearchBody {
            text_query: opt_text(&filters.text_query),
            primary_skills: filters.primary_skills.clone(),
            primary_skills_match_type: match_type,
            secondary_skills: filters.secondary_skills.clone(),
            min_experience: stringify(&filters.min_experience),
            max_experience: stringify(&filters.max_experience),
            min_current_package: stringify(&filters.min_current_package),
            max_current_package: stringify(&filters.max_current_package),
            min_expected_ctc: stringify(&filters.min_expected_ctc),
            max_expected_ctc: stringify(&filters.max_expected_ctc),
            locations: filters.locations.clone(),
            statuses: filters.statuses.clone(),
            sources: filters.sources.clone(),
            created_from: filters.created_from,
            created_to: filters.created_to,
            page: page.page,
            size: page.size,
            sort_by: page.sort_by.clone(),
            sort_direction: page.sort_direction,
        }
    }
}

/// Wire shape of `POST /api/openings/advanced-search`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningSearchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    text_query: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    departments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    types: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    locations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_salary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    statuses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_to: Option<NaiveDate>,
    page: u32,
    size: u32,
    sort_by: String,
    sort_direction: SortDirection,
}

impl SearchDomain for OpeningDomain {
    type Filters = OpeningFilters;
    type Row = Opening;
    type Body = OpeningSearchBody;

    const DOMAIN: Domain = Domain::Openings;
    const ENDPOINT: &'static str = "/api/openings/advanced-search";
    const STORAGE_KEY: &'static str = "opening_saved_searches";

    fn request_body(filters: &Self::Filters, page: &PageRequest) -> Self::Body {
        OpeningSearchBody {
            text_query: opt_text(&filters.text_query),
            departments: filters.departments.clone(),
            types: filters.types.clone(),
            locations: filters.locations.clone(),
            skills: filters.skills.clone(),
            min_experience: stringify(&filters.min_experience),
            max_experience: stringify(&filters.max_experience),
            min_salary: stringify(&filters.min_salary),
            max_salary: stringify(&filters.max_salary),
            statuses: filters.statuses.clone(),
            created_from: filters.created_from,
            created_to: filters.created_to,
            page: page.page,
            size: page.size,
            sort_by: page.sort_by.clone(),
            sort_direction: page.sort_direction,
        }
    }
}

pub struct SearchClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl SearchClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, SearchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    /// Run one search for `D`. No retries; a failure is reported once and
    /// the caller decides what stays on screen.
    pub fn execute<D: SearchDomain>(
        &self,
        filters: &D::Filters,
        page: &PageRequest,
    ) -> Result<SearchResult<D::Row>, SearchError> {
        let body = D::request_body(filters, page);
        let url = format!("{}{}", self.base_url, D::ENDPOINT);

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SearchError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        let result: SearchResult<D::Row> = serde_json::from_str(&text)?;
        Ok(result)
    }
}

use chrono::NaiveDate;

use crate::models::{Candidate, Domain, Opening};

pub const CANDIDATE_COLUMNS: [&str; 11] = [
    "Name",
    "Email",
    "Phone",
    "Experience (Years)",
    "Current Package",
    "Expected CTC",
    "Skills",
    "Location",
    "Status",
    "Source",
    "Created Date",
];

pub const OPENING_COLUMNS: [&str; 9] = [
    "Title",
    "Department",
    "Type",
    "Location",
    "Experience Required",
    "Salary Range",
    "Skills",
    "Status",
    "Created Date",
];

// Quote cells containing the delimiter, quotes or line breaks, doubling
// embedded quotes (RFC 4180). A skill list with a comma in it must not
// shift columns.
fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn csv_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| csv_escape(cell))
        .collect::<Vec<_>>()
        .join(",")
}

fn cell(value: Option<&str>) -> String {
    value.unwrap_or("").to_string()
}

// Backend timestamps look like "2024-01-15T10:30:00"; the export shows just
// the date part.
fn date_cell(value: Option<&str>) -> String {
    value
        .map(|v| v.split('T').next().unwrap_or(v).to_string())
        .unwrap_or_default()
}

pub fn candidate_row(candidate: &Candidate) -> Vec<String> {
    vec![
        candidate.full_name(),
        cell(candidate.email.as_deref()),
        cell(candidate.phone.as_deref()),
        cell(candidate.experience.as_deref()),
        cell(candidate.current_package.as_deref()),
        cell(candidate.expected_ctc.as_deref()),
        cell(candidate.skills.as_deref()),
        cell(candidate.current_location.as_deref()),
        cell(candidate.status.as_deref()),
        cell(candidate.source.as_deref()),
        date_cell(candidate.created_at.as_deref()),
    ]
}

pub fn opening_row(opening: &Opening) -> Vec<String> {
    vec![
        cell(opening.title.as_deref()),
        cell(opening.department.as_deref()),
        cell(opening.opening_type.as_deref()),
        cell(opening.location.as_deref()),
        cell(opening.experience.as_deref()),
        opening.salary_range(),
        cell(opening.skills.as_deref()),
        cell(opening.status.as_deref()),
        date_cell(opening.created_at.as_deref()),
    ]
}

pub fn candidates_to_csv(rows: &[Candidate]) -> String {
    let mut out = CANDIDATE_COLUMNS.join(",");
    out.push('\n');
    for candidate in rows {
        out.push_str(&csv_line(&candidate_row(candidate)));
        out.push('\n');
    }
    out
}

pub fn openings_to_csv(rows: &[Opening]) -> String {
    let mut out = OPENING_COLUMNS.join(",");
    out.push('\n');
    for opening in rows {
        out.push_str(&csv_line(&opening_row(opening)));
        out.push('\n');
    }
    out
}

pub fn export_filename(domain: Domain, date: NaiveDate) -> String {
    format!("{}_search_results_{}.csv", domain.name(), date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal RFC-4180 reader used to prove exported lines survive a
    // round trip through a conforming parser.
    fn parse_csv_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut chars = line.chars().peekable();
        let mut quoted = false;

        while let Some(c) = chars.next() {
            if quoted {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        quoted = false;
                    }
                } else {
                    field.push(c);
                }
            } else if c == '"' {
                quoted = true;
            } else if c == ',' {
                fields.push(std::mem::take(&mut field));
            } else {
                field.push(c);
            }
        }
        fields.push(field);
        fields
    }

    #[test]
    fn test_embedded_comma_is_quoted() {
        assert_eq!(csv_escape("Java, Spring"), "\"Java, Spring\"");
        assert_eq!(csv_escape("plain"), "plain");
    }

    #[test]
    fn test_embedded_quote_is_doubled() {
        assert_eq!(csv_escape("He said \"ok\""), "\"He said \"\"ok\"\"\"");
    }

    #[test]
    fn test_embedded_newline_is_quoted() {
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_csv_round_trips_through_conforming_parser() {
        let line = csv_line(&[
            "Java, Spring".to_string(),
            "He said \"ok\"".to_string(),
            "plain".to_string(),
        ]);
        assert_eq!(
            parse_csv_line(&line),
            vec!["Java, Spring", "He said \"ok\"", "plain"]
        );
    }

    #[test]
    fn test_missing_values_render_as_empty_strings() {
        let row = candidate_row(&Candidate::default());
        assert_eq!(row.len(), CANDIDATE_COLUMNS.len());
        assert!(row.iter().all(|cell| cell.is_empty()));

        let csv = candidates_to_csv(&[Candidate::default()]);
        assert!(!csv.contains("null"));
        assert!(!csv.contains("None"));
    }

    #[test]
    fn test_candidate_csv_shape() {
        let candidate = Candidate {
            first_name: Some("Asha".to_string()),
            last_name: Some("Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            skills: Some("Java, Spring Boot".to_string()),
            created_at: Some("2024-02-10T09:12:00".to_string()),
            ..Default::default()
        };
        let csv = candidates_to_csv(&[candidate]);
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), CANDIDATE_COLUMNS.join(","));

        let row = parse_csv_line(lines.next().unwrap());
        assert_eq!(row[0], "Asha Rao");
        assert_eq!(row[1], "asha@example.com");
        assert_eq!(row[6], "Java, Spring Boot");
        assert_eq!(row[10], "2024-02-10");
    }

    #[test]
    fn test_opening_csv_shape() {
        let opening = Opening {
            title: Some("Backend Engineer".to_string()),
            department: Some("Engineering".to_string()),
            opening_type: Some("Full-Time".to_string()),
            min_salary: Some("10".to_string()),
            max_salary: Some("18".to_string()),
            status: Some("ACTIVE".to_string()),
            ..Default::default()
        };
        let csv = openings_to_csv(&[opening]);
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), OPENING_COLUMNS.join(","));

        let row = parse_csv_line(lines.next().unwrap());
        assert_eq!(row[0], "Backend Engineer");
        assert_eq!(row[5], "10 - 18");
        assert_eq!(row[7], "ACTIVE");
    }

    #[test]
    fn test_export_filename_includes_domain_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            export_filename(Domain::Candidates, date),
            "candidates_search_results_2024-03-07.csv"
        );
        assert_eq!(
            export_filename(Domain::Openings, date),
            "openings_search_results_2024-03-07.csv"
        );
    }
}

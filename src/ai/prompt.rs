use crate::git::RepoMetadata;
use chrono::NaiveDate;
use std::path::Path;

/// Report sections, in order, with what each should contain
pub const REPORT_SECTIONS: [(&str, &str); 5] = [
    ("Highlights", "the main changes of the day summarized in 2-3 lines"),
    ("Commits", "every commit in the period"),
    ("Changed Files", "the files changed in the period"),
    ("Open Issues and Pull Requests", "the status of open issues and pull requests"),
    ("Recommended Actions", "items that look like they need attention, if any"),
];

fn push_sections(prompt: &mut String) {
    for (i, (title, contents)) in REPORT_SECTIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. `## {}`: {}\n", i + 1, title, contents));
    }
}

/// Prompt for a single API call with the metadata already collected
pub fn build_report_prompt(date: NaiveDate, window_hours: u32, metadata: &RepoMetadata) -> String {
    let date = date.format("%Y-%m-%d");
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Generate the daily report for this repository for {}.\n\n",
        date
    ));
    prompt.push_str(&format!(
        "Below is the repository activity from the last {} hours.\n\n",
        window_hours
    ));

    prompt.push_str("## Commits\n");
    prompt.push_str(&metadata.commit_log);
    prompt.push_str("\n\n## Changed Files\n");
    prompt.push_str(&metadata.changed_files);
    prompt.push_str("\n\n## Open Issues and Pull Requests\n");
    prompt.push_str(&metadata.issues_and_prs);
    prompt.push_str("\n\n");

    prompt.push_str("Write the report in Markdown with the following sections:\n");
    push_sections(&mut prompt);
    prompt.push_str(&format!(
        "\nStart with the heading \"# Daily Report {}\" and reply with the report only.\n",
        date
    ));

    prompt
}

/// Prompt for the agent, which gathers the metadata with its own tools
pub fn build_agent_prompt(
    date: NaiveDate,
    window_hours: u32,
    issue_limit: u32,
    report_path: &Path,
) -> String {
    let date = date.format("%Y-%m-%d");
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Generate the daily report for this repository for {}.\n\n",
        date
    ));
    prompt.push_str("Collect the information with the following steps and write a Markdown report:\n\n");
    prompt.push_str(&format!(
        "1. `git log --since=\"{h} hours ago\" --oneline --no-merges` to see the commits from the last {h} hours\n",
        h = window_hours
    ));
    prompt.push_str(&format!(
        "2. `git log --since=\"{} hours ago\" --name-only --pretty=format:` to see the changed files\n",
        window_hours
    ));
    prompt.push_str(&format!(
        "3. `gh issue list --state open --limit {}` to see open issues (skip if gh is unavailable)\n",
        issue_limit
    ));
    prompt.push_str(&format!(
        "4. `gh pr list --state open --limit {}` to see open pull requests (skip if gh is unavailable)\n\n",
        issue_limit
    ));

    prompt.push_str("The report must contain the following sections:\n");
    push_sections(&mut prompt);
    prompt.push_str(&format!(
        "\nStart with the heading \"# Daily Report {}\" and save the report to {}.\n",
        date,
        report_path.display()
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> RepoMetadata {
        RepoMetadata {
            commit_log: "abc123 fix bug".to_string(),
            changed_files: "a.py\nb.py".to_string(),
            issues_and_prs: "### Issues\n[]\n\n### Pull Requests\n[]".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_report_prompt_contents() {
        let prompt = build_report_prompt(date("2026-10-15"), 24, &metadata());

        assert!(prompt.contains("for 2026-10-15"));
        assert!(prompt.contains("last 24 hours"));
        assert!(prompt.contains("abc123 fix bug"));
        assert!(prompt.contains("a.py\nb.py"));
        assert!(prompt.contains("### Pull Requests"));
        for (title, _) in REPORT_SECTIONS {
            assert!(prompt.contains(&format!("## {}", title)), "missing {}", title);
        }
        assert!(prompt.contains("5. `## Recommended Actions`: items"));
    }

    #[test]
    fn test_report_prompt_deterministic() {
        let a = build_report_prompt(date("2026-10-15"), 24, &metadata());
        let b = build_report_prompt(date("2026-10-15"), 24, &metadata());
        assert_eq!(a, b);

        let next_day = build_report_prompt(date("2026-10-16"), 24, &metadata());
        assert_eq!(a.replace("2026-10-15", "2026-10-16"), next_day);
    }

    #[test]
    fn test_agent_prompt_contents() {
        let path = Path::new("reports/daily-report-2026-10-15.md");
        let prompt = build_agent_prompt(date("2026-10-15"), 48, 5, path);

        assert!(prompt.contains("git log --since=\"48 hours ago\" --oneline --no-merges"));
        assert!(prompt.contains("--name-only --pretty=format:"));
        assert!(prompt.contains("gh issue list --state open --limit 5"));
        assert!(prompt.contains("gh pr list --state open --limit 5"));
        assert!(prompt.contains("## Highlights"));
        assert!(prompt.contains("save the report to reports/daily-report-2026-10-15.md"));
    }
}

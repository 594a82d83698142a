use crate::git::MetadataCollector;

pub const GH_UNAVAILABLE: &str = "gh CLI is not available; skipped.";
pub const NO_OPEN_ISSUES: &str = "No open issues found.";
pub const NO_OPEN_PRS: &str = "No open pull requests found.";

const ISSUE_FIELDS: &str = "number,title,labels,updatedAt";
const PR_FIELDS: &str = "number,title,author,updatedAt";

impl MetadataCollector {
    /// Open issues and pull requests as two labeled sections.
    ///
    /// Each section degrades on its own: a failed `gh pr list` does not hide
    /// a successful issue listing.
    pub async fn issues_and_prs(&self) -> String {
        let issues = self.gh_list("issue", ISSUE_FIELDS, NO_OPEN_ISSUES).await;
        let prs = self.gh_list("pr", PR_FIELDS, NO_OPEN_PRS).await;

        format!("### Issues\n{}\n\n### Pull Requests\n{}", issues, prs)
    }

    async fn gh_list(&self, kind: &str, fields: &str, empty: &str) -> String {
        let args = vec![
            kind.to_string(),
            "list".to_string(),
            "--state".to_string(),
            "open".to_string(),
            "--limit".to_string(),
            self.issue_limit.to_string(),
            "--json".to_string(),
            fields.to_string(),
        ];

        match self.runner.run("gh", &args).await {
            Ok(output) => {
                let trimmed = output.trim();
                if trimmed.is_empty() {
                    empty.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(e) => {
                tracing::warn!(kind, error = %e, "gh listing unavailable");
                GH_UNAVAILABLE.to_string()
            }
        }
    }
}

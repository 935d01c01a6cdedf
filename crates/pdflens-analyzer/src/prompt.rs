//! Instruction text for single-shot and partitioned analysis

use pdflens_chunker::Partition;

/// System instruction for analyzing a whole document in one call
pub const SYSTEM_INSTRUCTION: &str = r#"You are a document analysis assistant. Analyze PDF documents and answer questions based on their content.
For each question, provide a clear, detailed answer based on the content of the PDF.
If the answer cannot be determined from the PDF, say so explicitly.
Always respond with accurate information from the document."#;

const FINDINGS_INSTRUCTION: &str = r#"
In addition to answering the queries, produce a "findings_summary" field that tracks:
- What has been found so far (with page citations)
- What is partially answered
- What remains unanswered"#;

/// Build the user prompt listing the queries, numbered from 1
pub fn build_user_prompt(queries: &[String]) -> String {
    let numbered: Vec<String> = queries
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q))
        .collect();
    format!(
        "Please analyze the attached PDF and answer these questions:\n\n{}",
        numbered.join("\n")
    )
}

/// Page range of a partition within the original document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    /// Zero-based first page
    pub start_page: u32,
    /// Pages covered
    pub page_count: u32,
    /// Pages in the original document
    pub total_pages: u32,
}

impl From<&Partition> for PageSpan {
    fn from(partition: &Partition) -> Self {
        Self {
            start_page: partition.start_page(),
            page_count: partition.page_count(),
            total_pages: partition.total_pages(),
        }
    }
}

/// Builds the system instruction for one partition of a multi-part run
///
/// The form depends on position: the first partition allows incomplete
/// answers, later ones embed the previous findings, and the last one asks
/// for final answers.
pub struct ChunkPromptBuilder<'a> {
    index: usize,
    estimated_total: usize,
    previous_findings: Option<&'a str>,
    pages: Option<PageSpan>,
}

impl<'a> ChunkPromptBuilder<'a> {
    /// Create a builder for the partition at `index` of roughly `estimated_total`
    pub fn new(index: usize, estimated_total: usize) -> Self {
        Self {
            index,
            estimated_total,
            previous_findings: None,
            pages: None,
        }
    }

    /// Carry the findings produced by the previous partition
    pub fn with_previous_findings(mut self, findings: Option<&'a str>) -> Self {
        self.previous_findings = findings;
        self
    }

    /// Include the true page range (unknown when replaying cached handles)
    pub fn with_pages(mut self, pages: PageSpan) -> Self {
        self.pages = Some(pages);
        self
    }

    fn is_first(&self) -> bool {
        self.index == 0
    }

    fn is_final(&self) -> bool {
        self.index + 1 >= self.estimated_total
    }

    fn position_line(&self) -> String {
        let mut position = format!(
            "Processing chunk {} of {}",
            self.index + 1,
            self.estimated_total
        );
        if let Some(pages) = self.pages {
            position.push_str(&format!(
                " (pages {}–{} of {} total)",
                pages.start_page + 1,
                pages.start_page + pages.page_count,
                pages.total_pages
            ));
        }
        position.push('.');
        position
    }

    /// Build the complete system instruction
    pub fn build(&self) -> String {
        let mut prompt = format!(
            "You are a document analysis assistant analyzing a large PDF that has been split into {} chunks.\n{}\n\
             For each question, provide a clear, detailed answer based on the content of this chunk.\n\
             Always cite page numbers from the original document when possible.",
            self.estimated_total,
            self.position_line()
        );

        if self.is_first() {
            prompt.push_str("\nThis is the first chunk. Some answers may be incomplete; that's expected.");
            prompt.push_str(FINDINGS_INSTRUCTION);
            return prompt;
        }

        if self.is_final() {
            prompt.push_str("\nThis is the final chunk.");
        }

        prompt.push_str("\nHere are the findings from the previous chunks:\n<previous_findings>\n");
        prompt.push_str(self.previous_findings.unwrap_or_default());
        prompt.push_str("\n</previous_findings>\n\n");
        prompt.push_str(
            "Update your answers by combining the previous findings with any new information from this chunk.",
        );

        if self.is_final() {
            prompt.push_str(
                "\nProvide final, comprehensive answers incorporating all findings across the entire document.",
            );
        }

        prompt.push_str(FINDINGS_INSTRUCTION);
        prompt
    }
}

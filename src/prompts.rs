//! Prompt text for the summarizer.
//!
//! Pure formatting: paper titles and abstracts are embedded verbatim, with no
//! length limit.

use crate::cli::Variant;
use crate::models::ResearchPaper;

const PERSONA: &str = "Act as a PhD Bio-Strategist.";

/// Prompt asking for a summary of a paper.
pub fn research_prompt(paper: &ResearchPaper, source_label: &str, variant: Variant) -> String {
    let structure = match variant {
        Variant::Strategist => {
            "Structure:\n\
             1. The Scientific Discovery (What was found?)\n\
             2. Biological Mechanism (How does it work inside the hen?)\n\
             3. Farm Application (What should a manager do with this info?)\n\
             4. Future Outlook.\n\
             Write in a professional, insightful, and sophisticated tone."
        }
        Variant::Digest => {
            "Structure:\n\
             1. The Hook (Why should a poultry professional care today?)\n\
             2. The Science (What did the researchers do and find?)\n\
             3. The Impact (What changes on the farm because of it?)\n\
             4. The Outlook (Where does this research go next?)\n\
             Write for experienced farm managers: precise, clear, and engaging."
        }
    };

    format!(
        "{PERSONA} Summarize this {source_label} for our farm blog.\n\
         Paper Title: {title}\n\
         Abstract Body: {abstract_text}\n\
         \n\
         {structure}",
        title = paper.title,
        abstract_text = paper.abstract_text,
    )
}

/// Prompt asking for a textbook-style overview of a topic.
pub fn textbook_prompt(topic: &str) -> String {
    format!(
        "{PERSONA} Provide a comprehensive summary of '{topic}' \
         based on the knowledge found in standard textbooks like 'Sturkie's Avian Physiology'. \
         Explain the fundamental biological systems involved and how they relate to hen health \
         and production efficiency. Use 5 clear, detailed paragraphs."
    )
}

/// Title of the post generated for a textbook topic.
pub fn textbook_title(topic: &str) -> String {
    format!("Bio-Fundamentals: {topic}")
}

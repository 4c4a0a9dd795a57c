use serde::{Deserialize, Serialize};

/// Exam section a subskill or item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Quant,
    Verbal,
    Writing,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Quant => "quant",
            Section::Verbal => "verbal",
            Section::Writing => "writing",
        }
    }

    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s {
            "quant" => Ok(Self::Quant),
            "verbal" => Ok(Self::Verbal),
            "writing" => Ok(Self::Writing),
            _ => Err(format!("Unknown section: {}", s)),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The finest unit of tracked competence.
///
/// Every item names exactly one primary subskill; ability (IRT) and mastery
/// (BKT) are both tracked per subskill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SubskillId {
    // Quant
    Algebra,
    Arithmetic,
    Geometry,
    DataAnalysis,
    // Verbal
    ReadingComprehension,
    TextCompletion,
    SentenceEquivalence,
    // Writing
    IssueAnalysis,
    ArgumentAnalysis,
}

impl SubskillId {
    /// All subskills in canonical order (section-major).
    pub const ALL: [SubskillId; 9] = [
        SubskillId::Algebra,
        SubskillId::Arithmetic,
        SubskillId::Geometry,
        SubskillId::DataAnalysis,
        SubskillId::ReadingComprehension,
        SubskillId::TextCompletion,
        SubskillId::SentenceEquivalence,
        SubskillId::IssueAnalysis,
        SubskillId::ArgumentAnalysis,
    ];

    pub fn section(&self) -> Section {
        match self {
            SubskillId::Algebra
            | SubskillId::Arithmetic
            | SubskillId::Geometry
            | SubskillId::DataAnalysis => Section::Quant,
            SubskillId::ReadingComprehension
            | SubskillId::TextCompletion
            | SubskillId::SentenceEquivalence => Section::Verbal,
            SubskillId::IssueAnalysis | SubskillId::ArgumentAnalysis => Section::Writing,
        }
    }

    /// Human-readable name for UI display.
    pub fn display_name(&self) -> &'static str {
        match self {
            SubskillId::Algebra => "Algebra & Equations",
            SubskillId::Arithmetic => "Arithmetic & Number Properties",
            SubskillId::Geometry => "Geometry",
            SubskillId::DataAnalysis => "Data Analysis",
            SubskillId::ReadingComprehension => "Reading Comprehension",
            SubskillId::TextCompletion => "Text Completion",
            SubskillId::SentenceEquivalence => "Sentence Equivalence",
            SubskillId::IssueAnalysis => "Analyze an Issue",
            SubskillId::ArgumentAnalysis => "Analyze an Argument",
        }
    }

    /// How many diagnostic items this subskill targets before its estimate
    /// is considered settled, absent an early SE cutoff.
    pub fn diagnostic_target(&self) -> u32 {
        match self.section() {
            Section::Quant | Section::Verbal => 5,
            Section::Writing => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubskillId::Algebra => "algebra",
            SubskillId::Arithmetic => "arithmetic",
            SubskillId::Geometry => "geometry",
            SubskillId::DataAnalysis => "data_analysis",
            SubskillId::ReadingComprehension => "reading_comprehension",
            SubskillId::TextCompletion => "text_completion",
            SubskillId::SentenceEquivalence => "sentence_equivalence",
            SubskillId::IssueAnalysis => "issue_analysis",
            SubskillId::ArgumentAnalysis => "argument_analysis",
        }
    }

    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s {
            "algebra" => Ok(Self::Algebra),
            "arithmetic" => Ok(Self::Arithmetic),
            "geometry" => Ok(Self::Geometry),
            "data_analysis" => Ok(Self::DataAnalysis),
            "reading_comprehension" => Ok(Self::ReadingComprehension),
            "text_completion" => Ok(Self::TextCompletion),
            "sentence_equivalence" => Ok(Self::SentenceEquivalence),
            "issue_analysis" => Ok(Self::IssueAnalysis),
            "argument_analysis" => Ok(Self::ArgumentAnalysis),
            _ => Err(format!("Unknown subskill: {}", s)),
        }
    }

    /// Subskills belonging to a section, in canonical order.
    pub fn in_section(section: Section) -> Vec<SubskillId> {
        Self::ALL
            .iter()
            .copied()
            .filter(|s| s.section() == section)
            .collect()
    }
}

impl std::fmt::Display for SubskillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

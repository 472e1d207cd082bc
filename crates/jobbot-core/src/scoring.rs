//! Additive relevance scoring.
//!
//! A [`Scorer`] is an ordered list of [`Signal`]s. Each signal inspects the
//! job and may emit one or more [`Hit`]s; the score is the sum of all hit
//! points and the trace is the hit labels in evaluation order.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{LocationPolicy, Settings, SkillWeight};
use crate::error::AppError;
use crate::models::JobRecord;

pub const SENIOR_KEYWORDS: &[&str] = &[
    "senior",
    "sr.",
    "lead",
    "principal",
    "staff",
    "manager",
    "architect",
];

pub const JUNIOR_KEYWORDS: &[&str] = &["intern", "junior", "jr.", "trainee", "fresher", "entry"];

pub const SPONSOR_KEYWORDS: &[&str] = &[
    "visa",
    "sponsor",
    "sponsorship",
    "relocation",
    "work permit",
];

static TITLE_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdata engineer\b").expect("valid title regex"));

/// Whether any of `keywords` is a substring of `haystack`.
pub fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// Result of scoring a single job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub total: i64,
    /// Labels of the signals that fired, in evaluation order.
    pub signals: Vec<String>,
}

/// A single contribution to the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub label: String,
    pub points: i64,
}

impl Hit {
    pub fn new(label: impl Into<String>, points: i64) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// Precomputed views of a job shared by all signals.
pub struct ScoringContext<'a> {
    pub job: &'a JobRecord,
    pub haystack: String,
    pub title: String,
}

impl<'a> ScoringContext<'a> {
    pub fn new(job: &'a JobRecord) -> Self {
        Self {
            job,
            haystack: job.haystack(),
            title: job.title.to_lowercase(),
        }
    }
}

/// One scoring rule.
pub trait Signal: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit>;
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Whole-word "data engineer" in the title.
pub struct TitleMatch {
    pub bonus: i64,
}

impl Signal for TitleMatch {
    fn name(&self) -> &'static str {
        "title"
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit> {
        if TITLE_PHRASE.is_match(&ctx.title) {
            vec![Hit::new("title:data engineer", self.bonus)]
        } else {
            vec![]
        }
    }
}

/// Senior bonus and junior penalty, checked independently.
pub struct Seniority {
    pub senior_bonus: i64,
    pub junior_penalty: i64,
}

impl Signal for Seniority {
    fn name(&self) -> &'static str {
        "seniority"
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit> {
        let mut hits = Vec::new();
        if contains_any(&ctx.haystack, SENIOR_KEYWORDS) {
            hits.push(Hit::new("seniority:senior", self.senior_bonus));
        }
        if contains_any(&ctx.haystack, JUNIOR_KEYWORDS) {
            hits.push(Hit::new("seniority:junior", -self.junior_penalty));
        }
        hits
    }
}

/// Each configured skill term counts once, however often it occurs.
pub struct SkillKeywords {
    pub skills: Vec<SkillWeight>,
}

impl Signal for SkillKeywords {
    fn name(&self) -> &'static str {
        "skills"
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit> {
        self.skills
            .iter()
            .filter(|s| ctx.haystack.contains(&s.term.to_lowercase()))
            .map(|s| Hit::new(s.term.to_lowercase(), s.weight))
            .collect()
    }
}

/// Preferred locations; earlier entries weigh more.
pub struct LocationPreference {
    pub locations: Vec<String>,
    pub bonus: i64,
    pub step: i64,
    pub floor: i64,
    pub policy: LocationPolicy,
}

impl LocationPreference {
    fn weight_at(&self, index: usize) -> i64 {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        let decayed = self.bonus.saturating_sub(self.step.saturating_mul(index));
        decayed.max(self.floor)
    }
}

impl Signal for LocationPreference {
    fn name(&self) -> &'static str {
        "location"
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (index, location) in self.locations.iter().enumerate() {
            let needle = location.trim().to_lowercase();
            if needle.is_empty() || !ctx.haystack.contains(&needle) {
                continue;
            }
            hits.push(Hit::new(format!("location:{needle}"), self.weight_at(index)));
            if self.policy == LocationPolicy::First {
                break;
            }
        }
        hits
    }
}

/// Visa/sponsorship/relocation mentions.
pub struct Sponsorship {
    pub bonus: i64,
    pub enabled: bool,
}

impl Signal for Sponsorship {
    fn name(&self) -> &'static str {
        "visa"
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit> {
        if self.enabled && contains_any(&ctx.haystack, SPONSOR_KEYWORDS) {
            vec![Hit::new("visa", self.bonus)]
        } else {
            vec![]
        }
    }
}

/// Company name or link host matches a known product company.
pub struct ProductCompany {
    pub companies: Vec<String>,
    pub strict: bool,
    pub strict_bonus: i64,
    pub neutral_bonus: i64,
}

impl ProductCompany {
    fn matches(&self, job: &JobRecord) -> bool {
        let company = job.company.to_lowercase();
        let host = Url::parse(&job.link)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();

        self.companies
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .any(|c| company.contains(&c) || host.contains(&c))
    }
}

impl Signal for ProductCompany {
    fn name(&self) -> &'static str {
        "product_company"
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit> {
        if !self.matches(ctx.job) {
            return vec![];
        }
        let points = if self.strict {
            self.strict_bonus
        } else {
            self.neutral_bonus
        };
        vec![Hit::new("product_company", points)]
    }
}

/// Parse a scraped applicant count such as `"42"`, `"1,200"`, `"25+"` or
/// `"17 applicants"`.
pub fn parse_applicant_count(raw: &str) -> Option<u32> {
    let token = raw.split_whitespace().next()?;
    let token = token.trim_end_matches('+').replace(',', "");
    token.parse().ok()
}

/// Bonus for postings with few applicants. Unparseable counts are ignored.
pub struct LowApplicants {
    pub ceiling: u32,
    pub bonus: i64,
}

impl Signal for LowApplicants {
    fn name(&self) -> &'static str {
        "low_applicants"
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit> {
        match ctx.job.applicant_count.as_deref().and_then(parse_applicant_count) {
            Some(count) if count <= self.ceiling => vec![Hit::new("low_applicants", self.bonus)],
            _ => vec![],
        }
    }
}

/// Small nudge for anything mentioning "data" or "engineer".
pub struct BasePresence {
    pub bonus: i64,
}

impl Signal for BasePresence {
    fn name(&self) -> &'static str {
        "base"
    }

    fn evaluate(&self, ctx: &ScoringContext<'_>) -> Vec<Hit> {
        if ctx.haystack.contains("data") || ctx.haystack.contains("engineer") {
            vec![Hit::new("base", self.bonus)]
        } else {
            vec![]
        }
    }
}

// ---------------------------------------------------------------------------
// Scorer
// ---------------------------------------------------------------------------

/// Applies its signals in order and sums their hits.
pub struct Scorer {
    signals: Vec<Box<dyn Signal>>,
}

impl Scorer {
    /// The standard signal sequence, weighted from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let w = &settings.weights;
        Self::with_signals(vec![
            Box::new(TitleMatch {
                bonus: w.title_bonus,
            }),
            Box::new(Seniority {
                senior_bonus: w.senior_bonus,
                junior_penalty: w.junior_penalty,
            }),
            Box::new(SkillKeywords {
                skills: settings.skills.clone(),
            }),
            Box::new(LocationPreference {
                locations: settings.location_priority.clone(),
                bonus: w.location_bonus,
                step: w.location_step,
                floor: w.location_floor,
                policy: settings.location_policy,
            }),
            Box::new(Sponsorship {
                bonus: w.sponsor_bonus,
                enabled: settings.global_allow_visa_sponsor,
            }),
            Box::new(ProductCompany {
                companies: settings.product_companies.clone(),
                strict: settings.product_company_only,
                strict_bonus: w.product_strict_bonus,
                neutral_bonus: w.product_neutral_bonus,
            }),
            Box::new(LowApplicants {
                ceiling: settings.max_applicants_for_low,
                bonus: w.low_applicants_bonus,
            }),
            Box::new(BasePresence { bonus: w.base_bonus }),
        ])
    }

    pub fn with_signals(signals: Vec<Box<dyn Signal>>) -> Self {
        Self { signals }
    }

    pub fn signal_names(&self) -> Vec<&'static str> {
        self.signals.iter().map(|s| s.name()).collect()
    }

    /// Compute a score card without touching the job.
    pub fn evaluate(&self, job: &JobRecord) -> ScoreCard {
        let ctx = ScoringContext::new(job);
        let mut total: i64 = 0;
        let mut signals = Vec::new();
        for signal in &self.signals {
            for hit in signal.evaluate(&ctx) {
                total = total.saturating_add(hit.points);
                signals.push(hit.label);
            }
        }
        ScoreCard { total, signals }
    }

    /// Score a job in place.
    pub fn score(&self, job: &mut JobRecord) -> Result<(), AppError> {
        let card = self.evaluate(job);
        tracing::debug!(
            title = %job.title,
            score = card.total,
            signals = ?card.signals,
            "Scored job"
        );
        job.apply_score(card)
    }

    /// Score every job; records that were already scored keep their card.
    pub fn score_all(&self, mut jobs: Vec<JobRecord>) -> Vec<JobRecord> {
        for job in &mut jobs {
            if let Err(e) = self.score(job) {
                tracing::warn!(error = %e, "Skipping rescore");
            }
        }
        jobs
    }
}

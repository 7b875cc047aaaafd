//! Rule-set scoring engine.
//!
//! A [`RuleSet`] is an ordered list of weighted conditions plus tier
//! thresholds. Scoring evaluates every rule against the latest bar of an
//! [`IndicatorFrame`]; each match adds its points and appends its reason.
//! Rules run in category order (trend, momentum, structure) and keep their
//! configured order within a category, so the reason list is stable.
//!
//! Two deployments ship as presets of the same engine: [`RuleSet::platinum`]
//! and [`RuleSet::godmode`].

use serde::Serialize;
use std::fmt;

use crate::domain::error::ScanError;
use crate::domain::indicator::frame::{FrameField, IndicatorFrame};
use crate::domain::rule::Rule;
use crate::domain::rule_eval;

pub const PRESET_NAMES: [&str; 2] = ["platinum", "godmode"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Trend,
    Momentum,
    Structure,
}

impl Category {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trend" => Some(Category::Trend),
            "momentum" => Some(Category::Momentum),
            "structure" => Some(Category::Structure),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Trend => write!(f, "trend"),
            Category::Momentum => write!(f, "momentum"),
            Category::Structure => write!(f, "structure"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Elite,
    Strong,
    Neutral,
    Weak,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Elite => write!(f, "elite"),
            Tier::Strong => write!(f, "strong"),
            Tier::Neutral => write!(f, "neutral"),
            Tier::Weak => write!(f, "weak"),
        }
    }
}

/// `score >= elite` is elite, `>= strong` strong, `<= weak` weak, anything
/// in between neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierThresholds {
    pub elite: u8,
    pub strong: u8,
    pub weak: u8,
}

impl TierThresholds {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.elite > 100 {
            return Err(invalid_tier("elite", "must be at most 100"));
        }
        if self.strong >= self.elite {
            return Err(invalid_tier("strong", "must be below elite"));
        }
        if self.weak >= self.strong {
            return Err(invalid_tier("weak", "must be below strong"));
        }
        Ok(())
    }

    pub fn tier_for(&self, score: u8) -> Tier {
        if score >= self.elite {
            Tier::Elite
        } else if score >= self.strong {
            Tier::Strong
        } else if score <= self.weak {
            Tier::Weak
        } else {
            Tier::Neutral
        }
    }
}

fn invalid_tier(key: &str, reason: &str) -> ScanError {
    ScanError::ConfigInvalid {
        section: "scoring".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRule {
    pub category: Category,
    pub condition: Rule,
    pub points: i32,
    pub reason: String,
}

impl ScoreRule {
    pub fn new(category: Category, points: i32, reason: &str, condition: Rule) -> Self {
        Self {
            category,
            condition,
            points,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub name: String,
    rules: Vec<ScoreRule>,
    pub tiers: TierThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: u8,
    pub reasons: Vec<String>,
    pub tier: Tier,
}

impl RuleSet {
    /// Validates thresholds and orders rules by category (stable).
    pub fn new(
        name: impl Into<String>,
        mut rules: Vec<ScoreRule>,
        tiers: TierThresholds,
    ) -> Result<Self, ScanError> {
        tiers.validate()?;
        if rules.is_empty() {
            return Err(ScanError::RuleInvalid {
                reason: "rule set has no rules".to_string(),
            });
        }
        if let Some(rule) = rules.iter().find(|r| r.reason.trim().is_empty()) {
            return Err(ScanError::RuleInvalid {
                reason: format!("{} rule worth {} points has no reason", rule.category, rule.points),
            });
        }
        rules.sort_by_key(|r| r.category);
        Ok(Self {
            name: name.into(),
            rules,
            tiers,
        })
    }

    pub fn rules(&self) -> &[ScoreRule] {
        &self.rules
    }

    pub fn with_tiers(mut self, tiers: TierThresholds) -> Result<Self, ScanError> {
        tiers.validate()?;
        self.tiers = tiers;
        Ok(self)
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "platinum" => Some(Self::platinum()),
            "godmode" => Some(Self::godmode()),
            _ => None,
        }
    }

    /// Full bullish-stack variant: rewards close > SMA50 > SMA200 with an
    /// alignment bonus, RSI sweet spot 50-75, overheated above 80.
    pub fn platinum() -> Self {
        let mut rules = trend_rules(true);
        rules.extend(momentum_rules(75.0, 80.0));
        rules.extend(structure_rules(10));
        Self {
            name: "platinum".to_string(),
            rules,
            tiers: TierThresholds {
                elite: 90,
                strong: 70,
                weak: 50,
            },
        }
    }

    /// Above-both-averages variant: no alignment bonus, tighter RSI band
    /// (50-70, overheated above 75) and a heavier squeeze weight.
    pub fn godmode() -> Self {
        let mut rules = trend_rules(false);
        rules.extend(momentum_rules(70.0, 75.0));
        rules.extend(structure_rules(20));
        Self {
            name: "godmode".to_string(),
            rules,
            tiers: TierThresholds {
                elite: 80,
                strong: 60,
                weak: 40,
            },
        }
    }

    /// Scores the latest bar of `frame`.
    pub fn score(&self, frame: &IndicatorFrame) -> ScoreResult {
        let Some(index) = frame.last_index() else {
            return ScoreResult {
                score: 0,
                reasons: Vec::new(),
                tier: self.tiers.tier_for(0),
            };
        };

        let mut total: i32 = 0;
        let mut reasons = Vec::new();
        for rule in &self.rules {
            if rule_eval::evaluate(&rule.condition, frame, index) {
                total = total.saturating_add(rule.points);
                reasons.push(rule.reason.clone());
            }
        }

        let score = total.clamp(0, 100) as u8;
        ScoreResult {
            score,
            reasons,
            tier: self.tiers.tier_for(score),
        }
    }
}

/// Free-function form of [`RuleSet::score`].
pub fn score(rule_set: &RuleSet, frame: &IndicatorFrame) -> ScoreResult {
    rule_set.score(frame)
}

fn trend_rules(alignment_bonus: bool) -> Vec<ScoreRule> {
    use FrameField::{Close, Sma50, Sma200};

    let above_50 = Rule::above(Close, Sma50);
    let above_both = Rule::And(vec![Rule::above(Close, Sma50), Rule::above(Close, Sma200)]);

    let mut rules = vec![
        ScoreRule::new(Category::Trend, 20, "trend confirmed: close above SMA50", above_50.clone()),
        ScoreRule::new(Category::Trend, 20, "above both averages: close above SMA200", above_both),
    ];
    if alignment_bonus {
        rules.push(ScoreRule::new(
            Category::Trend,
            10,
            "ideal alignment: close > SMA50 > SMA200",
            Rule::And(vec![
                Rule::above(Close, Sma50),
                Rule::above(Close, Sma200),
                Rule::above(Sma50, Sma200),
            ]),
        ));
    }
    rules.push(ScoreRule::new(
        Category::Trend,
        0,
        "above SMA50 but capped by SMA200",
        Rule::And(vec![
            above_50.clone(),
            Rule::not(Rule::above(Close, Sma200)),
        ]),
    ));
    rules.push(ScoreRule::new(
        Category::Trend,
        0,
        "bearish: close at or below SMA50",
        Rule::not(above_50),
    ));
    rules
}

fn momentum_rules(healthy_ceiling: f64, overheated_above: f64) -> Vec<ScoreRule> {
    vec![
        ScoreRule::new(
            Category::Momentum,
            30,
            "healthy strength: RSI in the sweet spot",
            Rule::between(FrameField::Rsi, 50.0, healthy_ceiling),
        ),
        ScoreRule::new(
            Category::Momentum,
            20,
            "oversold bounce candidate: RSI below 30",
            Rule::below(FrameField::Rsi, 30.0),
        ),
        ScoreRule::new(
            Category::Momentum,
            -10,
            "overheated risk: RSI stretched",
            Rule::greater_than(FrameField::Rsi, overheated_above),
        ),
    ]
}

fn structure_rules(squeeze_points: i32) -> Vec<ScoreRule> {
    vec![
        ScoreRule::new(
            Category::Structure,
            squeeze_points,
            "compression: Bollinger inside Keltner (pre-breakout)",
            Rule::Squeeze,
        ),
        ScoreRule::new(
            Category::Structure,
            10,
            "bullish crossover: MACD above signal",
            Rule::above(FrameField::MacdLine, FrameField::MacdSignal),
        ),
    ]
}

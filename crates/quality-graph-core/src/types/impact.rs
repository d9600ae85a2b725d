//! Impacts: directed, justified, severity-weighted influences between factors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::element::ElementId;

/// Direction of an impact's influence on its target factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceEffect {
    Positive,
    Negative,
}

impl InfluenceEffect {
    /// Sign applied to the origin factor's score during propagation.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// Impact severity on the inclusive scale 1 (most severe) to 5 (least).
///
/// The setter is deliberately permissive: an out-of-range value is silently
/// rejected and the previous value retained. The default is 5, the weakest
/// contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    pub const MOST_SEVERE: Severity = Severity(1);
    pub const LEAST_SEVERE: Severity = Severity(5);

    /// Creates a severity, returning `None` when out of the 1..=5 range.
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Self(value))
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::LEAST_SEVERE
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed influence edge from one factor onto another.
///
/// Impacts reference their target by identifier only; ownership stays with
/// the model arena so logical cycles never become ownership cycles. An
/// impact with no target, or no justification, is inert: validation reports
/// it and propagation ignores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub id: ElementId,
    /// Rationale for the influence. A model is invalid without one.
    pub justification: Option<String>,
    pub effect: InfluenceEffect,
    /// Factor this impact influences.
    pub target: Option<ElementId>,
    /// Factor this impact originates from.
    pub origin: Option<ElementId>,
    /// Free-form origin name, kept for traceability when the origin factor
    /// is not (yet) part of the model.
    pub origin_name: Option<String>,
    severity: Severity,
    /// Marker for a planned target not yet wired into the live graph.
    /// Such impacts stay inert until a real target is set.
    pub future_target: Option<String>,
}

impl Impact {
    /// Starts building an Impact. Nothing is required at creation; an
    /// impact only becomes eligible for propagation once it has a target
    /// and a justification.
    pub fn builder() -> ImpactBuilder {
        ImpactBuilder {
            impact: Impact {
                id: ElementId::generate(),
                justification: None,
                effect: InfluenceEffect::Positive,
                target: None,
                origin: None,
                origin_name: None,
                severity: Severity::default(),
                future_target: None,
            },
        }
    }

    #[inline]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Sets the severity. Out-of-range values (outside 1..=5) are silently
    /// ignored and the previous value is kept.
    pub fn set_severity(&mut self, value: u8) {
        if let Some(severity) = Severity::new(value) {
            self.severity = severity;
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "impact {} ({:?}, severity {})",
            self.id, self.effect, self.severity
        )
    }
}

/// Fluent builder for [`Impact`]. Consumed by `create()`.
#[derive(Debug)]
pub struct ImpactBuilder {
    impact: Impact,
}

impl ImpactBuilder {
    pub fn identifier(mut self, id: impl Into<ElementId>) -> Self {
        self.impact.id = id.into();
        self
    }

    pub fn justification(mut self, justification: impl Into<String>) -> Self {
        self.impact.justification = Some(justification.into());
        self
    }

    pub fn effect(mut self, effect: InfluenceEffect) -> Self {
        self.impact.effect = effect;
        self
    }

    pub fn target(mut self, factor: impl Into<ElementId>) -> Self {
        self.impact.target = Some(factor.into());
        self
    }

    pub fn origin(mut self, factor: impl Into<ElementId>) -> Self {
        self.impact.origin = Some(factor.into());
        self
    }

    pub fn origin_name(mut self, name: impl Into<String>) -> Self {
        self.impact.origin_name = Some(name.into());
        self
    }

    /// Sets the severity, with the same silent out-of-range rejection as
    /// [`Impact::set_severity`].
    pub fn severity(mut self, value: u8) -> Self {
        self.impact.set_severity(value);
        self
    }

    pub fn future_target(mut self, name: impl Into<String>) -> Self {
        self.impact.future_target = Some(name.into());
        self
    }

    /// Finishes construction. Always succeeds; missing target or
    /// justification is a structural issue reported by validation, not a
    /// construction error.
    pub fn create(self) -> Impact {
        self.impact
    }
}

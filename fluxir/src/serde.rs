use fluxdrasil::glyphs::Metric;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::predicate::{Combiner, Criterion, Predicate};

/// The flat `{kind, comparator, value, combiner}` form of a predicate.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct PredicateSerdeRepr {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comparator: Option<String>,
    value: String,
    #[serde(default)]
    combiner: Combiner,
}

impl PredicateSerdeRepr {
    fn comparator<T>(&self) -> Result<T, String>
    where
        T: std::str::FromStr<Err = String>,
    {
        let Some(comparator) = &self.comparator else {
            return Err(format!("{} predicates need a comparator", self.kind));
        };
        comparator.parse()
    }

    fn criterion(&self) -> Result<Criterion, String> {
        Ok(match self.kind.as_str() {
            "name" => Criterion::Name {
                comparator: self.comparator()?,
                value: self.value.clone(),
            },
            "category" => Criterion::Category(self.value.trim().parse()?),
            "member" => Criterion::MemberOf(self.value.clone()),
            "anchor" => Criterion::HasAnchor(self.value.clone()),
            kind => match kind.parse::<Metric>() {
                Ok(metric) => Criterion::Metric {
                    metric,
                    comparator: self.comparator()?,
                    value: self.value.clone(),
                },
                Err(_) => return Err(format!("Unknown predicate kind '{kind}'")),
            },
        })
    }
}

impl From<PredicateSerdeRepr> for Predicate {
    fn from(from: PredicateSerdeRepr) -> Self {
        let criterion = from.criterion().unwrap_or_else(|reason| {
            warn!("Keeping malformed predicate as one that matches nothing: {reason}");
            Criterion::Invalid {
                kind: from.kind,
                comparator: from.comparator,
                value: from.value,
                reason,
            }
        });
        Predicate {
            criterion,
            combiner: from.combiner,
        }
    }
}

impl From<Predicate> for PredicateSerdeRepr {
    fn from(from: Predicate) -> Self {
        let (kind, comparator, value) = match from.criterion {
            Criterion::Name { comparator, value } => {
                ("name".to_string(), Some(comparator.as_str()), value)
            }
            Criterion::Metric {
                metric,
                comparator,
                value,
            } => (metric.as_str().to_string(), Some(comparator.as_str()), value),
            Criterion::Category(category) => {
                ("category".to_string(), None, category.as_str().to_string())
            }
            Criterion::MemberOf(class) => ("member".to_string(), None, class),
            Criterion::HasAnchor(anchor) => ("anchor".to_string(), None, anchor),
            Criterion::Invalid {
                kind,
                comparator,
                value,
                ..
            } => {
                return PredicateSerdeRepr {
                    kind,
                    comparator,
                    value,
                    combiner: from.combiner,
                }
            }
        };
        PredicateSerdeRepr {
            kind,
            comparator: comparator.map(str::to_string),
            value,
            combiner: from.combiner,
        }
    }
}

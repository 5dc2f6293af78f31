//! Weather go/no-go advice as an ordered, first-match-wins rule table.

use log::debug;
use pwpro_schemas::{
    rule::{AdvisoryRule, ComparisonOperator, Condition},
    weather::{Advisory, SafetyStatus, WeatherSnapshot, WorkCategory},
};

pub struct AdvisoryTable {
    rules: Vec<AdvisoryRule>,
}

impl Default for AdvisoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl AdvisoryTable {
    pub fn new(rules: Vec<AdvisoryRule>) -> Self {
        Self { rules }
    }

    /// The thresholds the crews have been working with.
    #[rustfmt::skip]
    pub fn standard() -> Self {
        use ComparisonOperator::{AtLeast, GreaterThan};
        use SafetyStatus::{Dangerous, Suboptimal};
        use WorkCategory::{Concrete, Roof, Siding};

        let wind = |operator, mph| Condition::Wind { operator, mph };
        let temp = |operator, fahrenheit| Condition::Temperature { operator, fahrenheit };
        let rain = |operator, percent| Condition::RainChance { operator, percent };

        Self::new(vec![
            rule("roof_wind", Some(Roof), wind(AtLeast, 15.0), Dangerous,
                "Not recommended: wind {wind} mph, risk of overspray"),
            rule("roof_heat", Some(Roof), temp(AtLeast, 100.0), Dangerous,
                "Not recommended: high temp {temp}°F, evaporation risk"),
            rule("roof_rain", Some(Roof), rain(GreaterThan, 30.0), Suboptimal,
                "Rain risk: slippery surfaces and chemical dilution possible"),
            rule("siding_wind", Some(Siding), wind(AtLeast, 20.0), Suboptimal,
                "Windy: use caution with high-reach wands and overspray"),
            rule("siding_rain", Some(Siding), rain(GreaterThan, 40.0), Suboptimal,
                "Rain may affect chemical dwell time"),
            rule("concrete_rain", Some(Concrete), rain(GreaterThan, 60.0), Suboptimal,
                "Heavy rain: surface cleaning effectiveness reduced"),
            rule("high_wind", None, wind(AtLeast, 20.0), Suboptimal,
                "High wind {wind} mph, caution recommended"),
            rule("extreme_heat", None, temp(AtLeast, 105.0), Suboptimal,
                "Extreme heat {temp}°F, caution recommended"),
            rule(
                "adverse_weather",
                None,
                Condition::AnyOf {
                    conditions: vec![wind(GreaterThan, 25.0), rain(GreaterThan, 70.0)],
                },
                Suboptimal,
                "Adverse weather: use professional judgment",
            ),
        ])
    }

    pub fn rules(&self) -> &[AdvisoryRule] {
        &self.rules
    }

    /// Advice for a job described by free-text scope (e.g. "Roof wash").
    pub fn evaluate(&self, scope: &str, weather: Option<&WeatherSnapshot>) -> Advisory {
        self.evaluate_category(WorkCategory::from_scope(scope), weather)
    }

    pub fn evaluate_category(
        &self,
        category: WorkCategory,
        weather: Option<&WeatherSnapshot>,
    ) -> Advisory {
        let Some(weather) = weather else {
            return Advisory {
                category,
                status: SafetyStatus::Optimal,
                recommended: true,
                message: "No weather data; use judgment".to_string(),
                rule: None,
            };
        };

        let fired = self
            .rules
            .iter()
            .filter(|r| r.category.map_or(true, |c| c == category))
            .find(|r| evaluate_condition(&r.condition, weather));

        match fired {
            Some(rule) => {
                debug!("advisory: rule '{}' fired for {} work", rule.name, category);
                Advisory {
                    category,
                    status: rule.status,
                    recommended: rule.status == SafetyStatus::Optimal,
                    message: render_message(&rule.message, weather),
                    rule: Some(rule.name.clone()),
                }
            }
            None => Advisory {
                category,
                status: SafetyStatus::Optimal,
                recommended: true,
                message: match category {
                    WorkCategory::Roof => "Conditions look good for roof work".to_string(),
                    other => format!("Conditions look acceptable for {} work", other),
                },
                rule: None,
            },
        }
    }
}

fn rule(
    name: &str,
    category: Option<WorkCategory>,
    condition: Condition,
    status: SafetyStatus,
    message: &str,
) -> AdvisoryRule {
    AdvisoryRule {
        name: name.to_string(),
        category,
        condition,
        status,
        message: message.to_string(),
    }
}

pub fn evaluate_condition(condition: &Condition, weather: &WeatherSnapshot) -> bool {
    match condition {
        Condition::Wind { operator, mph } => operator.compare(weather.wind_speed_mph, *mph),
        Condition::Temperature {
            operator,
            fahrenheit,
        } => operator.compare(weather.temperature_f, *fahrenheit),
        Condition::RainChance { operator, percent } => weather
            .rain_chance_percent
            .map_or(false, |rain| operator.compare(rain, *percent)),
        Condition::AnyOf { conditions } => {
            conditions.iter().any(|c| evaluate_condition(c, weather))
        }
        Condition::AllOf { conditions } => {
            conditions.iter().all(|c| evaluate_condition(c, weather))
        }
    }
}

/// Fills `{wind}` and `{temp}` with whole-number readings.
fn render_message(template: &str, weather: &WeatherSnapshot) -> String {
    template
        .replace("{wind}", &(weather.wind_speed_mph.trunc() as i64).to_string())
        .replace("{temp}", &(weather.temperature_f.trunc() as i64).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(temperature_f: f64, wind_speed_mph: f64, rain: Option<f64>) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_f,
            wind_speed_mph,
            rain_chance_percent: rain,
            description: None,
        }
    }

    #[test]
    fn missing_weather_defers_to_judgment() {
        let advisory = AdvisoryTable::standard().evaluate("Roof wash", None);
        assert!(advisory.recommended);
        assert_eq!(advisory.message, "No weather data; use judgment");
    }

    #[test]
    fn roof_in_wind_is_dangerous() {
        let weather = snapshot(72.0, 15.4, None);
        let advisory = AdvisoryTable::standard().evaluate("Roof soft wash", Some(&weather));
        assert_eq!(advisory.category, WorkCategory::Roof);
        assert_eq!(advisory.status, SafetyStatus::Dangerous);
        assert!(!advisory.recommended);
        assert_eq!(advisory.message, "Not recommended: wind 15 mph, risk of overspray");
        assert_eq!(advisory.rule.as_deref(), Some("roof_wind"));
    }

    #[test]
    fn roof_rule_order_is_first_match_wins() {
        let weather = snapshot(101.0, 16.0, Some(90.0));
        let advisory = AdvisoryTable::standard().evaluate("roof", Some(&weather));
        assert_eq!(advisory.rule.as_deref(), Some("roof_wind"));
    }

    #[test]
    fn general_work_tolerates_more_wind_than_roofs() {
        let weather = snapshot(80.0, 17.0, None);
        let table = AdvisoryTable::standard();
        assert!(!table.evaluate("Roof wash", Some(&weather)).recommended);
        let fence = table.evaluate("Fence cleaning", Some(&weather));
        assert!(fence.recommended);
        assert_eq!(fence.message, "Conditions look acceptable for general work");
    }

    #[test]
    fn heat_message_renders_temperature() {
        let weather = snapshot(106.7, 3.0, None);
        let advisory = AdvisoryTable::standard().evaluate("Driveway", Some(&weather));
        assert_eq!(advisory.category, WorkCategory::Concrete);
        assert_eq!(advisory.message, "Extreme heat 106°F, caution recommended");
    }

    #[test]
    fn rain_rules_need_a_forecast() {
        let table = AdvisoryTable::standard();
        let dry = snapshot(70.0, 5.0, None);
        assert!(table.evaluate("house wash", Some(&dry)).recommended);
        let wet = snapshot(70.0, 5.0, Some(45.0));
        let advisory = table.evaluate("house wash", Some(&wet));
        assert_eq!(advisory.status, SafetyStatus::Suboptimal);
        assert_eq!(advisory.rule.as_deref(), Some("siding_rain"));
    }

    #[test]
    fn any_of_matches_either_branch() {
        let table = AdvisoryTable::standard();
        let stormy = snapshot(70.0, 5.0, Some(75.0));
        let advisory = table.evaluate("deck", Some(&stormy));
        assert_eq!(advisory.rule.as_deref(), Some("adverse_weather"));
    }

    #[test]
    fn custom_table_replaces_standard_rules() {
        let table = AdvisoryTable::new(vec![rule(
            "freezing",
            None,
            Condition::AllOf {
                conditions: vec![Condition::Temperature {
                    operator: ComparisonOperator::AtMost,
                    fahrenheit: 32.0,
                }],
            },
            SafetyStatus::Dangerous,
            "Freezing at {temp}°F",
        )]);
        let advisory = table.evaluate("anything", Some(&snapshot(28.0, 0.0, None)));
        assert_eq!(advisory.message, "Freezing at 28°F");
        assert_eq!(table.rules().len(), 1);
    }
}

//! Chart Composer: runs the pipeline for each chart type.
//!
//! instant -> ephemeris -> zodiac frame -> houses -> placements -> aspects.
//! Any failing stage fails the whole chart.

use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::aspects::{AspectDetector, OrbPolicy};
use crate::astronomy::signed_delta;
use crate::chart::composite::{midpoint_instant, midpoint_positions};
use crate::chart::lunar_phase::LunarPhase;
use crate::chart::options::{ChartOptions, ChartType, CompositeHouseMode};
use crate::chart::relationship::RelationshipScore;
use crate::chart::subject::{ChartRequest, SubjectSpec};
use crate::chart::types::{Chart, HouseOverlay, SubjectChart};
use crate::ephemeris::{AnalyticEphemeris, BodyPosition, EphemerisProvider, Perspective, Point};
use crate::error::AstroError;
use crate::houses::{HouseCalculator, HouseCusps, HouseSystem};
use crate::instant::{Instant, InstantResolver};
use crate::placement::{Placement, PlacementAssembler};
use crate::settings::EngineSettings;
use crate::zodiac::{AyanamshaTable, ZodiacFrame};

/// Half-width of the finite difference used for angle speeds (one minute)
const ANGLE_SPEED_STEP_DAYS: f64 = 1.0 / 1440.0;

/// Stateless chart computation service. Cheap to clone; clones share the
/// provider and ayanamsha table.
#[derive(Clone)]
pub struct ChartEngine {
    provider: Arc<dyn EphemerisProvider>,
    ayanamshas: Arc<AyanamshaTable>,
    settings: EngineSettings,
    houses: HouseCalculator,
}

impl fmt::Debug for ChartEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartEngine")
            .field("provider", &self.provider.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Default for ChartEngine {
    fn default() -> Self {
        Self::new(Arc::new(AnalyticEphemeris::new()), EngineSettings::default())
    }
}

/// Options resolved against the engine defaults
struct Plan {
    frame: ZodiacFrame,
    house_system: HouseSystem,
    perspective: Perspective,
    points: Vec<Point>,
    detector: AspectDetector,
    assembler: PlacementAssembler,
    resolver: InstantResolver,
    composite_houses: CompositeHouseMode,
}

impl ChartEngine {
    pub fn new(provider: Arc<dyn EphemerisProvider>, settings: EngineSettings) -> Self {
        Self {
            provider,
            ayanamshas: Arc::new(AyanamshaTable::builtin().clone()),
            settings,
            houses: HouseCalculator::new(),
        }
    }

    pub fn with_ayanamsha_table(mut self, table: AyanamshaTable) -> Self {
        self.ayanamshas = Arc::new(table);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn compute_request(&self, request: &ChartRequest) -> Result<Chart, AstroError> {
        self.compute_chart(&request.subjects, request.chart_type, &request.options)
    }

    /// Compute a chart. Subjects are ordered as documented on [`Chart`].
    pub fn compute_chart(
        &self,
        subjects: &[SubjectSpec],
        chart_type: ChartType,
        options: &ChartOptions,
    ) -> Result<Chart, AstroError> {
        let expected = chart_type.subject_count();
        if subjects.len() != expected {
            return Err(AstroError::UnsupportedConfiguration {
                field: "subjects".to_string(),
                value: subjects.len().to_string(),
                valid: vec![format!("exactly {expected} for a {chart_type} chart")],
            });
        }

        let plan = self.plan(options)?;
        let instants = subjects
            .iter()
            .map(|s| plan.resolver.resolve(&s.birth))
            .collect::<Result<Vec<_>, _>>()?;
        let mut layers = subjects.iter().zip(instants);

        let chart = match chart_type {
            ChartType::Natal => {
                let natal = self.next_layer(&mut layers, &plan, None)?;
                let aspects = plan.detector.within(0, &natal.placements);
                Chart {
                    chart_type,
                    subjects: vec![natal],
                    aspects,
                    house_overlays: Vec::new(),
                    relationship: None,
                }
            }
            ChartType::Transit => {
                let natal = self.next_layer(&mut layers, &plan, None)?;
                let moment = self.next_layer(&mut layers, &plan, natal.houses.as_ref())?;
                let aspects = plan
                    .detector
                    .between((1, &moment.placements), (0, &natal.placements));
                Chart {
                    chart_type,
                    subjects: vec![natal, moment],
                    aspects,
                    house_overlays: Vec::new(),
                    relationship: None,
                }
            }
            ChartType::Synastry => {
                let first = self.next_layer(&mut layers, &plan, None)?;
                let second = self.next_layer(&mut layers, &plan, None)?;
                let aspects = plan
                    .detector
                    .between((0, &first.placements), (1, &second.placements));
                let mut house_overlays = overlay(1, &second, 0, &first);
                house_overlays.extend(overlay(0, &first, 1, &second));
                let relationship =
                    RelationshipScore::evaluate(&first.placements, &second.placements, &aspects);
                Chart {
                    chart_type,
                    subjects: vec![first, second],
                    aspects,
                    house_overlays,
                    relationship: Some(relationship),
                }
            }
            ChartType::Composite => {
                let first = self.next_layer(&mut layers, &plan, None)?;
                let second = self.next_layer(&mut layers, &plan, None)?;
                let composite = self.composite_layer(&first, &second, &plan)?;
                let aspects = plan.detector.within(2, &composite.placements);
                Chart {
                    chart_type,
                    subjects: vec![first, second, composite],
                    aspects,
                    house_overlays: Vec::new(),
                    relationship: None,
                }
            }
        };

        info!(
            "Computed {} chart for {} ({} placements, {} aspects)",
            chart.chart_type,
            chart
                .subjects
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            chart.subjects.iter().map(|s| s.placements.len()).sum::<usize>(),
            chart.aspects.len()
        );
        Ok(chart)
    }

    /// Compute a chart on the blocking pool, bounded by the configured
    /// timeout. A timeout is reported as a retryable ephemeris failure.
    pub async fn compute_chart_async(&self, request: ChartRequest) -> Result<Chart, AstroError> {
        let engine = self.clone();
        let limit_ms = self.settings.ephemeris_timeout_ms;
        let task = tokio::task::spawn_blocking(move || engine.compute_request(&request));

        match tokio::time::timeout(Duration::from_millis(limit_ms), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AstroError::EphemerisUnavailable {
                body: None,
                reason: format!("chart computation aborted: {join_error}"),
                retryable: false,
            }),
            Err(_) => {
                warn!("Chart computation exceeded {limit_ms} ms");
                Err(AstroError::EphemerisUnavailable {
                    body: None,
                    reason: format!("no result within {limit_ms} ms"),
                    retryable: true,
                })
            }
        }
    }

    fn plan(&self, options: &ChartOptions) -> Result<Plan, AstroError> {
        let frame = ZodiacFrame::new(options.zodiac_type, options.sidereal_mode, &self.ayanamshas)?;
        let perspective = options.perspective;
        let points = self.active_points(options.active_points.as_deref(), perspective)?;

        let include_minor = options
            .include_minor_aspects
            .unwrap_or(self.settings.include_minor_aspects);
        let policy = OrbPolicy::from_table(&self.settings.orbs, include_minor)
            .with_overrides(&options.orb_overrides)?;

        let plan = Plan {
            frame,
            house_system: options.house_system.unwrap_or(self.settings.house_system),
            perspective,
            points,
            detector: AspectDetector::new(policy).with_stationary_epsilon(self.settings.stationary_epsilon),
            assembler: PlacementAssembler::new(self.settings.stationary_epsilon),
            resolver: InstantResolver::new(options.ambiguous_time.unwrap_or(self.settings.ambiguous_time)),
            composite_houses: options.composite_houses.unwrap_or(self.settings.composite_houses),
        };
        debug!(
            "Plan: {} zodiac{}, {} houses, {} perspective, {} points",
            plan.frame.zodiac_type(),
            plan.frame
                .sidereal_mode()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default(),
            plan.house_system,
            plan.perspective,
            plan.points.len()
        );
        Ok(plan)
    }

    /// Explicit points must all exist in the perspective; defaulted ones are
    /// filtered down to those that do.
    fn active_points(
        &self,
        requested: Option<&[Point]>,
        perspective: Perspective,
    ) -> Result<Vec<Point>, AstroError> {
        let mut points = match requested {
            Some(requested) => {
                if let Some(bad) = requested.iter().find(|p| !p.available_in(perspective)) {
                    return Err(AstroError::unsupported(
                        "active_points",
                        bad.name(),
                        Point::ALL
                            .iter()
                            .filter(|p| p.available_in(perspective))
                            .map(|p| p.name()),
                    ));
                }
                requested.to_vec()
            }
            None => {
                let (kept, dropped): (Vec<Point>, Vec<Point>) = self
                    .settings
                    .default_active_points
                    .iter()
                    .copied()
                    .partition(|p| p.available_in(perspective));
                if !dropped.is_empty() {
                    warn!(
                        "Default points {:?} have no {} position; leaving them out",
                        dropped.iter().map(Point::name).collect::<Vec<_>>(),
                        perspective
                    );
                }
                kept
            }
        };
        points.sort();
        points.dedup();
        Ok(points)
    }

    fn next_layer<'a>(
        &self,
        layers: &mut impl Iterator<Item = (&'a SubjectSpec, Instant)>,
        plan: &Plan,
        house_source: Option<&HouseCusps>,
    ) -> Result<SubjectChart, AstroError> {
        let (spec, instant) = layers.next().ok_or_else(|| AstroError::UnsupportedConfiguration {
            field: "subjects".to_string(),
            value: "too few".to_string(),
            valid: vec!["one entry per chart subject".to_string()],
        })?;
        self.subject_chart(&spec.name, instant, plan, house_source)
    }

    /// Placements for one subject. House numbers come from `house_source`
    /// when given, else from the subject's own cusps. The subject's own cusps
    /// are only computed when they are used, so a borrowed frame never fails
    /// on the subject's latitude.
    fn subject_chart(
        &self,
        name: &str,
        instant: Instant,
        plan: &Plan,
        house_source: Option<&HouseCusps>,
    ) -> Result<SubjectChart, AstroError> {
        let jd = instant.julian_day_tt();
        let bodies: Vec<Point> = plan.points.iter().copied().filter(|p| !p.is_angle()).collect();

        let mut positions = self.provider.positions(&instant, &bodies, plan.perspective)?;
        debug!(
            "{}: {} positions from {} at JD {:.5}",
            name,
            positions.len(),
            self.provider.name(),
            instant.julian_day_ut()
        );

        let wants_angles = plan.points.iter().any(Point::is_angle);
        let tropical_houses = match house_source {
            Some(_) if !wants_angles => None,
            _ => Some(self.houses.for_instant(plan.house_system, &instant)?),
        };
        if let Some(tropical) = tropical_houses.as_ref().filter(|_| wants_angles) {
            positions.extend(self.angle_positions(plan, &instant, tropical)?);
        }

        for position in positions.values_mut() {
            position.longitude = plan.frame.apply(position.longitude, jd);
        }
        let houses = house_source
            .cloned()
            .or_else(|| tropical_houses.map(|own| own.in_frame(&plan.frame, jd)));
        let placements = plan.assembler.assemble(&positions, houses.as_ref());

        Ok(SubjectChart {
            name: name.to_string(),
            zodiac_type: plan.frame.zodiac_type(),
            sidereal_mode: plan.frame.sidereal_mode(),
            ayanamsha: plan.frame.ayanamsha(jd),
            house_system: plan.house_system,
            perspective: plan.perspective,
            houses,
            lunar_phase: lunar_phase(&placements),
            placements,
            instant,
        })
    }

    /// Angle longitudes with speeds from a centred difference of the houses
    fn angle_positions(
        &self,
        plan: &Plan,
        instant: &Instant,
        houses: &HouseCusps,
    ) -> Result<Vec<(Point, BodyPosition)>, AstroError> {
        let before = self
            .houses
            .for_instant(plan.house_system, &instant.shifted(-ANGLE_SPEED_STEP_DAYS)?)?;
        let after = self
            .houses
            .for_instant(plan.house_system, &instant.shifted(ANGLE_SPEED_STEP_DAYS)?)?;

        Ok(plan
            .points
            .iter()
            .filter_map(|&point| {
                let now = angle_longitude(houses, point)?;
                let speed = signed_delta(angle_longitude(&before, point)?, angle_longitude(&after, point)?)
                    / (2.0 * ANGLE_SPEED_STEP_DAYS);
                Some((
                    point,
                    BodyPosition {
                        longitude: now,
                        latitude: 0.0,
                        distance: 0.0,
                        speed,
                    },
                ))
            })
            .collect())
    }

    fn composite_layer(
        &self,
        first: &SubjectChart,
        second: &SubjectChart,
        plan: &Plan,
    ) -> Result<SubjectChart, AstroError> {
        let mut positions = midpoint_positions(&first.placements, &second.placements);
        let instant = midpoint_instant(&first.instant, &second.instant)?;
        let jd = instant.julian_day_tt();

        let houses = match plan.composite_houses {
            CompositeHouseMode::DerivedMidpoint => Some(
                self.houses
                    .for_instant(plan.house_system, &instant)?
                    .in_frame(&plan.frame, jd),
            ),
            CompositeHouseMode::Unavailable => None,
        };
        // Angles follow the composite cusps so the Ascendant opens house 1
        if let Some(houses) = &houses {
            for (point, position) in positions.iter_mut() {
                if let Some(longitude) = angle_longitude(houses, *point) {
                    position.longitude = longitude;
                }
            }
        }
        let placements = plan.assembler.assemble(&positions, houses.as_ref());

        Ok(SubjectChart {
            name: format!("{} & {}", first.name, second.name),
            zodiac_type: plan.frame.zodiac_type(),
            sidereal_mode: plan.frame.sidereal_mode(),
            ayanamsha: plan.frame.ayanamsha(jd),
            house_system: plan.house_system,
            perspective: plan.perspective,
            houses,
            lunar_phase: lunar_phase(&placements),
            placements,
            instant,
        })
    }
}

fn angle_longitude(houses: &HouseCusps, point: Point) -> Option<f64> {
    match point {
        Point::Ascendant => Some(houses.ascendant),
        Point::Midheaven => Some(houses.midheaven),
        Point::Descendant => Some(houses.descendant),
        Point::ImumCoeli => Some(houses.imum_coeli),
        _ => None,
    }
}

fn lunar_phase(placements: &[Placement]) -> Option<LunarPhase> {
    let find = |point| placements.iter().find(|p| p.point == point);
    let (sun, moon) = (find(Point::Sun)?, find(Point::Moon)?);
    Some(LunarPhase::from_longitudes(sun.longitude, moon.longitude))
}

/// Each point of `from` located in the houses of `into`
fn overlay(from_index: usize, from: &SubjectChart, into_index: usize, into: &SubjectChart) -> Vec<HouseOverlay> {
    let Some(houses) = into.houses.as_ref() else {
        return Vec::new();
    };
    from.placements
        .iter()
        .map(|p| HouseOverlay {
            subject: from_index,
            point: p.point,
            houses_of: into_index,
            house: houses.house_of(p.longitude),
        })
        .collect()
}

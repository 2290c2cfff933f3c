//! # Time-Step Loss Engine
//!
//! Answers prestress loss queries, driving the analysis of a girder line
//! forward only as far as each query needs.
//!
//! Girders sharing a relative girder index across groups form a girder line
//! and are analyzed together. Each line moves through
//! `Uninitialized → FrictionAndAnchorSetComputed → ComputedThrough(k)`; friction
//! and anchor set are computed once, then intervals are appended in order,
//! every POI of the line growing in lock-step.

use std::collections::BTreeMap;

use crate::bridge::StrandType;
use crate::errors::{LossError, LossResult};
use crate::losses::anchor_set::{
    anchor_set_loss, average_losses, solve_anchor_set, AnchorSetProblem,
};
use crate::losses::classifier::StrandClassifier;
use crate::losses::config::LossConfig;
use crate::losses::details::{
    AnchorSetResult, FrictionLoss, GirderHistory, GirderLineHistory, LineStage, PerPoiRecord,
    TendonSummary, TimeStepState,
};
use crate::losses::finalizer::finalize_state;
use crate::losses::friction::{duct_friction, is_on_girder};
use crate::losses::initial_strain::{distribute_initial_strains, register_load_cases};
use crate::losses::initializer::{initialize_state, GirderContext};
use crate::losses::strands::strand_discretization;
use crate::materials::PrestressElement;
use crate::poi::{DuctIndex, GirderKey, IntervalIndex, MemberEnd, PointOfInterest};
use crate::progress::ProgressScope;
use crate::services::{AnalysisServices, BridgeModel};

/// Losses at a POI for one interval
#[derive(Debug, Clone, Copy)]
pub struct PoiLosses<'a> {
    /// Analyzed POI the values belong to
    pub poi: PointOfInterest,
    /// True when the requested POI was not analyzed and the nearest analyzed
    /// POI stands in for it
    pub approximate: bool,
    /// Friction and anchor-set loss per duct
    pub friction: &'a [FrictionLoss],
    pub state: &'a TimeStepState,
}

/// Time-step prestress loss engine
#[derive(Debug)]
pub struct TimeStepLossEngine {
    config: LossConfig,
    classifier: StrandClassifier,
    lines: BTreeMap<usize, GirderLineHistory>,
}

impl TimeStepLossEngine {
    /// Create an engine; fails when the configuration does not ask for a
    /// time-step analysis
    pub fn new(config: LossConfig) -> LossResult<Self> {
        config.validate()?;
        Ok(TimeStepLossEngine {
            config,
            classifier: StrandClassifier::new(),
            lines: BTreeMap::new(),
        })
    }

    pub fn config(&self) -> &LossConfig {
        &self.config
    }

    /// History of a girder line, if any of it has been computed
    pub fn history(&self, line: usize) -> Option<&GirderLineHistory> {
        self.lines.get(&line)
    }

    /// Drop every computed result
    pub fn clear(&mut self) {
        self.lines.clear();
        self.classifier.clear();
    }

    /// Ensure the girder line of `girder` is computed through `interval`
    pub fn compute(
        &mut self,
        services: &mut AnalysisServices<'_>,
        girder: GirderKey,
        interval: IntervalIndex,
    ) -> LossResult<&GirderLineHistory> {
        check_girder(services.model, girder)?;
        let count = services.model.interval_count();
        if count <= interval {
            return Err(LossError::IntervalOutOfRange { interval, count });
        }
        let line = girder.girder;
        self.ensure_friction(services.model, line)?;
        self.advance(services, line, interval)?;
        self.lines
            .get(&line)
            .ok_or_else(|| LossError::internal(format!("Girder line {} was not initialized", line)))
    }

    /// Friction, anchor set and time-step state at a POI
    pub fn losses(
        &mut self,
        services: &mut AnalysisServices<'_>,
        poi: &PointOfInterest,
        interval: IntervalIndex,
    ) -> LossResult<PoiLosses<'_>> {
        let line = self.compute(services, poi.girder, interval)?;
        let girder = line.girder(poi.girder).ok_or(LossError::GirderNotFound {
            group: poi.girder.group,
            girder: poi.girder.girder,
        })?;
        let (record, approximate) = girder
            .record_near(poi)
            .ok_or_else(|| {
                LossError::internal(format!("{} has no points of interest", poi.girder))
            })?;
        let state = record.history.get(interval).ok_or(LossError::IntervalOutOfRange {
            interval,
            count: record.history.len(),
        })?;
        if approximate {
            log::debug!(
                "No analyzed POI at {:.3} on {}, using the one at {:.3}",
                poi.dist_from_start,
                poi.girder,
                record.poi.dist_from_start
            );
        }
        Ok(PoiLosses {
            poi: record.poi,
            approximate,
            friction: &record.friction,
            state,
        })
    }

    /// Area-weighted effective prestress of a strand type
    pub fn effective_prestress(
        &mut self,
        services: &mut AnalysisServices<'_>,
        poi: &PointOfInterest,
        interval: IntervalIndex,
        strand_type: StrandType,
    ) -> LossResult<f64> {
        let losses = self.losses(services, poi, interval)?;
        Ok(losses.state.strand_effective_stress(strand_type))
    }

    /// Effective stress in a tendon; zero before it is stressed
    pub fn tendon_stress(
        &mut self,
        services: &mut AnalysisServices<'_>,
        poi: &PointOfInterest,
        interval: IntervalIndex,
        duct: DuctIndex,
    ) -> LossResult<f64> {
        let losses = self.losses(services, poi, interval)?;
        Ok(losses.state.tendons.get(duct).map_or(0.0, |tendon| tendon.fpe))
    }

    pub fn anchor_set(
        &mut self,
        services: &mut AnalysisServices<'_>,
        girder: GirderKey,
        duct: DuctIndex,
    ) -> LossResult<AnchorSetResult> {
        let history = self.friction_history(services.model, girder)?;
        history
            .anchor_sets
            .get(duct)
            .copied()
            .ok_or_else(|| no_such_duct(girder, duct))
    }

    /// Elongation of a tendon at one end
    pub fn elongation(
        &mut self,
        services: &mut AnalysisServices<'_>,
        girder: GirderKey,
        duct: DuctIndex,
        end: MemberEnd,
    ) -> LossResult<f64> {
        Ok(self.tendon_summary(services, girder, duct)?.elongation[end.index()])
    }

    /// Average friction loss of a tendon over the POIs on the girder
    pub fn average_friction_loss(
        &mut self,
        services: &mut AnalysisServices<'_>,
        girder: GirderKey,
        duct: DuctIndex,
    ) -> LossResult<f64> {
        Ok(self.tendon_summary(services, girder, duct)?.average_friction)
    }

    /// Average anchor-set loss of a tendon over the POIs on the girder
    pub fn average_anchor_set_loss(
        &mut self,
        services: &mut AnalysisServices<'_>,
        girder: GirderKey,
        duct: DuctIndex,
    ) -> LossResult<f64> {
        Ok(self.tendon_summary(services, girder, duct)?.average_anchor_set)
    }

    fn tendon_summary(
        &mut self,
        services: &mut AnalysisServices<'_>,
        girder: GirderKey,
        duct: DuctIndex,
    ) -> LossResult<TendonSummary> {
        let history = self.friction_history(services.model, girder)?;
        history
            .tendons
            .get(duct)
            .copied()
            .ok_or_else(|| no_such_duct(girder, duct))
    }

    fn friction_history(
        &mut self,
        model: &dyn BridgeModel,
        girder: GirderKey,
    ) -> LossResult<&GirderHistory> {
        check_girder(model, girder)?;
        self.ensure_friction(model, girder.girder)?;
        self.lines
            .get(&girder.girder)
            .and_then(|line| line.girder(girder))
            .ok_or(LossError::GirderNotFound {
                group: girder.group,
                girder: girder.girder,
            })
    }

    /// Friction and anchor-set pass, once per girder line
    fn ensure_friction(&mut self, model: &dyn BridgeModel, line: usize) -> LossResult<()> {
        if self.lines.contains_key(&line) {
            return Ok(());
        }
        let mut history = GirderLineHistory::new(line);
        for girder in line_girders(model, line) {
            history.girders.push(self.friction_pass(model, girder)?);
        }
        history.stage = LineStage::FrictionAndAnchorSetComputed;
        log::info!(
            "Friction and anchor set computed for girder line {} ({} girders)",
            line + 1,
            history.girders.len()
        );
        self.lines.insert(line, history);
        Ok(())
    }

    fn friction_pass(
        &self,
        model: &dyn BridgeModel,
        girder: GirderKey,
    ) -> LossResult<GirderHistory> {
        let mut pois = model.points_of_interest(girder);
        pois.sort();
        pois.dedup_by(|a, b| a.is_at(b));

        let length = model.girder_length(girder);
        let end_span_length = [
            model.end_span_length(girder, MemberEnd::Start),
            model.end_span_length(girder, MemberEnd::End),
        ];
        let mut records: Vec<PerPoiRecord> = pois.iter().copied().map(PerPoiRecord::new).collect();
        let mut anchor_sets = Vec::new();
        let mut tendons = Vec::new();

        for duct_index in 0..model.duct_count(girder) {
            let duct = model.duct(girder, duct_index);
            let modulus = model.prestress_modulus(PrestressElement::Tendon(girder, duct_index));
            let friction = duct_friction(
                model,
                girder,
                duct_index,
                &pois,
                length,
                &self.config.friction,
                modulus,
            );

            let on_girder: Vec<FrictionLoss> = pois
                .iter()
                .zip(friction.losses.iter())
                .filter(|(poi, _)| is_on_girder(poi, length))
                .map(|(_, loss)| *loss)
                .collect();
            let problem = AnchorSetProblem {
                duct: duct_index,
                losses: &on_girder,
                strand_count: duct.strand_count,
                jacking_end: duct.jacking_end,
                girder_length: length,
                tendon_modulus: modulus,
                anchor_set: self.config.friction.anchor_set,
                end_span_length,
            };
            let anchor_set = solve_anchor_set(&problem, &self.config.anchor_set_solver)?;

            for (record, mut loss) in records.iter_mut().zip(friction.losses) {
                if is_on_girder(&record.poi, length) {
                    loss.dfp_a = anchor_set_loss(&anchor_set, loss.x, length);
                }
                record.friction.push(loss);
            }
            let with_anchor_set: Vec<FrictionLoss> = records
                .iter()
                .filter(|record| is_on_girder(&record.poi, length))
                .map(|record| record.friction[duct_index])
                .collect();
            let (average_friction, average_anchor_set) = average_losses(&with_anchor_set);

            log::debug!(
                "{} duct {}: anchor set zones {:.1}/{:.1}, average friction {:.2}, \
                 average anchor set {:.2}",
                girder,
                duct_index + 1,
                anchor_set.lset[0],
                anchor_set.lset[1],
                average_friction,
                average_anchor_set
            );
            anchor_sets.push(anchor_set);
            tendons.push(TendonSummary {
                elongation: friction.elongation,
                average_friction,
                average_anchor_set,
            });
        }

        Ok(GirderHistory {
            girder,
            records,
            anchor_sets,
            tendons,
        })
    }

    /// Append intervals to a girder line up to and including `through`
    fn advance(
        &mut self,
        services: &mut AnalysisServices<'_>,
        line: usize,
        through: IntervalIndex,
    ) -> LossResult<()> {
        let TimeStepLossEngine {
            config,
            classifier,
            lines,
        } = self;
        let history = lines
            .get_mut(&line)
            .ok_or_else(|| {
                LossError::internal(format!("Girder line {} was not initialized", line))
            })?;
        let first = history.intervals_analyzed();
        if through < first {
            return Ok(());
        }

        let model = services.model;
        let scope = ProgressScope::begin(
            services.progress,
            &format!("Computing time-step losses for girder line {}", line + 1),
        );
        register_load_cases(&mut *services.solver);
        let strands = strand_discretization(config.strand_modeling);
        let contexts: Vec<GirderContext<'_>> = history
            .girders
            .iter()
            .map(|g| GirderContext::new(model, g.girder, strands))
            .collect();

        for interval in first..=through {
            scope.update(&format!(
                "Interval {} of {}: {}",
                interval + 1,
                model.interval_count(),
                model.description(interval)
            ));
            let result = step_interval(config, classifier, &contexts, history, services, interval);
            if let Err(err) = result {
                // drop the partial interval so every POI stays at the last finished one
                for record in history.girders.iter_mut().flat_map(|g| g.records.iter_mut()) {
                    record.history.truncate(interval);
                }
                return Err(err);
            }
            history.stage = LineStage::ComputedThrough(interval);
        }
        log::info!(
            "Time-step losses for girder line {} computed through interval {}",
            line + 1,
            through + 1
        );
        Ok(())
    }
}

fn step_interval(
    config: &LossConfig,
    classifier: &mut StrandClassifier,
    contexts: &[GirderContext<'_>],
    history: &mut GirderLineHistory,
    services: &mut AnalysisServices<'_>,
    interval: IntervalIndex,
) -> LossResult<()> {
    let model = services.model;
    let duration = model.interval(interval).duration();

    for (ctx, girder) in contexts.iter().zip(history.girders.iter_mut()) {
        for record in girder.records.iter_mut() {
            let inventory = classifier.inventory(model, record.poi.segment_key());
            let state = initialize_state(ctx, inventory, record, interval);
            record.history.push(state);
        }
        if 0.0 < duration {
            distribute_initial_strains(ctx, &mut *services.solver, &mut girder.records, interval);
        }
        for record in girder.records.iter_mut() {
            finalize_state(ctx, &*services.solver, &config.equilibrium, record, interval)?;
        }
    }
    Ok(())
}

/// Girders of every group that share a relative girder index
pub fn line_girders(model: &dyn BridgeModel, line: usize) -> Vec<GirderKey> {
    (0..model.group_count())
        .filter_map(|group| {
            let count = model.girder_count(group);
            (0 < count).then(|| GirderKey::new(group, line.min(count - 1)))
        })
        .collect()
}

fn no_such_duct(girder: GirderKey, duct: DuctIndex) -> LossError {
    LossError::invalid_input("duct", duct.to_string(), format!("{} has no such duct", girder))
}

fn check_girder(model: &dyn BridgeModel, girder: GirderKey) -> LossResult<()> {
    if girder.group < model.group_count() && girder.girder < model.girder_count(girder.group) {
        Ok(())
    } else {
        Err(LossError::GirderNotFound {
            group: girder.group,
            girder: girder.girder,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::losses::config::LossMethod;

    #[test]
    fn test_engine_rejects_other_loss_methods() {
        let config = LossConfig {
            method: LossMethod::Approximate,
            ..LossConfig::default()
        };
        let err = TimeStepLossEngine::new(config).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION");
    }

    #[test]
    fn test_new_engine_is_empty() {
        let mut engine = TimeStepLossEngine::new(LossConfig::default()).unwrap();
        assert!(engine.history(0).is_none());
        engine.clear();
        assert!(engine.history(0).is_none());
    }
}

use super::{Agent, AgentKind, log_decision};
use golf_core::belief::{EvAnalysis, EvParams, Recommendation, expected_value_draw_vs_discard};
use golf_core::game::action::Action;
use golf_core::game::view::GameView;

/// Follows the draw-versus-discard recommendation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvAgent {
    params: EvParams,
}

impl EvAgent {
    pub fn new(params: EvParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EvParams {
        &self.params
    }

    pub fn analyze(&self, view: &GameView) -> Option<EvAnalysis> {
        let seat = view.seat()?;
        view.is_my_turn()
            .then(|| expected_value_draw_vs_discard(view, seat, &self.params))
    }

    /// The move an analysis points at. When drawing, the agent has to commit
    /// before seeing the card, so it keeps blind only if that beats flipping.
    pub fn action_for(analysis: &EvAnalysis) -> Option<Action> {
        match analysis.recommendation {
            Recommendation::Discard => analysis.discard.map(|branch| Action::TakeDiscard {
                position: branch.position,
            }),
            Recommendation::Draw | Recommendation::NearIndifferent => {
                analysis.draw.map(|branch| {
                    if branch.expected_keep < branch.flip_ev {
                        Action::DrawKeep {
                            position: branch.keep_position,
                        }
                    } else {
                        Action::DrawDiscardAndFlip {
                            flip_position: branch.flip_position,
                        }
                    }
                })
            }
            Recommendation::NoMove => None,
        }
    }
}

impl Agent for EvAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Ev
    }

    fn decide(&mut self, view: &GameView) -> Option<Action> {
        let analysis = self.analyze(view)?;
        let action = Self::action_for(&analysis)?;
        log_decision(
            AgentKind::Ev,
            view,
            action,
            recommendation_label(analysis.recommendation),
            analysis.advantage,
        );
        Some(action)
    }
}

pub(super) fn recommendation_label(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Draw => "draw",
        Recommendation::Discard => "discard",
        Recommendation::NearIndifferent => "near_indifferent",
        Recommendation::NoMove => "no_move",
    }
}

use crate::{Choice, HandConfig, HandCounts, RngState, RoundConfig, Side, TableHost};

/// Upper bound on cards a rule can add to one hand.
pub const MAX_HAND_CARDS: usize = 64;

/// Both hands, the turn counter and the running score of one round.
///
/// Everything random goes through the table's `RngState`, so a seed
/// replays a round exactly as long as the same calls are made.
#[derive(Debug, Clone)]
pub struct Table {
    config: RoundConfig,
    rng: RngState,
    player: Vec<Choice>,
    opponent: Vec<Choice>,
    turn_offset: i64,
    current_turn: u32,
    total: i64,
    rerolls_used: u32,
    shown: Vec<String>,
}

impl Table {
    pub fn new(config: RoundConfig, seed: u64) -> Self {
        Self {
            config: config.normalized(),
            rng: RngState::from_seed(seed),
            player: Vec::new(),
            opponent: Vec::new(),
            turn_offset: 0,
            current_turn: 1,
            total: 0,
            rerolls_used: 0,
            shown: Vec::new(),
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Resets round state and deals fresh hands to both sides.
    pub fn deal(&mut self) {
        self.turn_offset = 0;
        self.current_turn = 1;
        self.total = 0;
        self.rerolls_used = 0;
        self.shown.clear();
        self.opponent = generate_hand(&mut self.rng, &self.config.opponent);
        self.player = generate_hand(&mut self.rng, &self.config.player);
    }

    pub fn reroll_player(&mut self) {
        self.player = generate_hand(&mut self.rng, &self.config.player);
        self.rerolls_used += 1;
    }

    pub fn hand(&self, side: Side) -> &[Choice] {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    fn hand_mut(&mut self, side: Side) -> &mut Vec<Choice> {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    fn room_in(&self, side: Side, wanted: u32) -> u32 {
        let room = MAX_HAND_CARDS.saturating_sub(self.hand(side).len());
        wanted.min(room as u32)
    }

    pub fn counts(&self, side: Side) -> HandCounts {
        HandCounts::of(self.hand(side))
    }

    pub fn planned_turns(&self) -> u32 {
        let planned = i64::from(self.config.turns_to_play).saturating_add(self.turn_offset);
        planned.clamp(1, i64::from(u32::MAX)) as u32
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    pub fn advance_turn(&mut self) {
        self.current_turn += 1;
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn add_score(&mut self, delta: i64) {
        self.total = self.total.saturating_add(delta);
    }

    pub fn rerolls_left(&self) -> u32 {
        self.config.reroll_max.saturating_sub(self.rerolls_used)
    }

    /// Removes the first player card matching `choice`.
    pub fn take_player_card(&mut self, choice: Choice) -> Option<Choice> {
        let index = self.player.iter().position(|card| *card == choice)?;
        Some(self.player.remove(index))
    }

    pub fn draw_opponent(&mut self, from_front: bool) -> Option<Choice> {
        if self.opponent.is_empty() {
            return None;
        }
        let index = if from_front {
            0
        } else {
            self.rng.below(self.opponent.len())
        };
        Some(self.opponent.remove(index))
    }

    /// Info lines shown since the last call.
    pub fn take_shown(&mut self) -> Vec<String> {
        std::mem::take(&mut self.shown)
    }
}

impl TableHost for Table {
    fn hand_count(&self, side: Side, choice: Choice) -> Option<u32> {
        Some(self.counts(side).get(choice))
    }

    fn peek_front(&self, side: Side) -> Option<Choice> {
        self.hand(side).first().copied()
    }

    fn peek_final(&self, side: Side) -> Option<Choice> {
        let hand = self.hand(side);
        if hand.is_empty() {
            return None;
        }
        let ahead = i64::from(self.planned_turns()) - i64::from(self.current_turn);
        let index = ahead.clamp(0, hand.len() as i64 - 1) as usize;
        hand.get(index).copied()
    }

    fn replace_opponent_cards(&mut self, choice: Choice, count: u32) -> Option<u32> {
        let candidates: Vec<usize> = self
            .opponent
            .iter()
            .enumerate()
            .filter(|(_, card)| **card != choice)
            .map(|(index, _)| index)
            .collect();
        let picks = self.rng.sample_distinct(&candidates, count as usize);
        for index in &picks {
            self.opponent[*index] = choice;
        }
        Some(picks.len() as u32)
    }

    fn replace_opponent_cards_randomly(&mut self, choice: Choice, count: u32) -> Option<u32> {
        let positions: Vec<usize> = (0..self.opponent.len()).collect();
        let picks = self.rng.sample_distinct(&positions, count as usize);
        let mut changed = 0;
        for index in picks {
            if self.opponent[index] != choice {
                self.opponent[index] = choice;
                changed += 1;
            }
        }
        Some(changed)
    }

    fn add_cards(&mut self, side: Side, choice: Choice, count: u32) -> Option<u32> {
        let count = self.room_in(side, count);
        let hand = self.hand_mut(side);
        hand.extend(std::iter::repeat(choice).take(count as usize));
        Some(count)
    }

    fn add_random_cards(&mut self, side: Side, count: u32) -> Option<u32> {
        let count = self.room_in(side, count);
        for _ in 0..count {
            let card = self.rng.choice();
            self.hand_mut(side).push(card);
        }
        Some(count)
    }

    fn adjust_planned_turns(&mut self, delta: i64) -> Option<u32> {
        self.turn_offset = self.turn_offset.saturating_add(delta);
        Some(self.planned_turns())
    }

    fn show_info(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }

    fn current_total_score(&self) -> i64 {
        self.total
    }

    fn rerolls_used(&self) -> u32 {
        self.rerolls_used
    }
}

/// Guaranteed cards first, random fill up to size, then a shuffle.
pub fn generate_hand(rng: &mut RngState, config: &HandConfig) -> Vec<Choice> {
    let size = config.size as usize;
    let mut hand = Vec::with_capacity(size);
    for choice in Choice::ALL {
        hand.extend(std::iter::repeat(choice).take(config.guaranteed(choice) as usize));
    }
    hand.truncate(size);
    while hand.len() < size {
        hand.push(rng.choice());
    }
    rng.shuffle(&mut hand);
    hand
}

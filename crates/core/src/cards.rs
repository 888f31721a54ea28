use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Opponent,
}

impl Choice {
    pub const ALL: [Self; 3] = [Self::Rock, Self::Paper, Self::Scissors];

    pub fn from_keyword(value: &str) -> Option<Self> {
        match crate::tags::keyword(value).as_str() {
            "rock" | "r" => Some(Self::Rock),
            "paper" | "p" => Some(Self::Paper),
            "scissors" | "s" => Some(Self::Scissors),
            _ => None,
        }
    }

    pub fn from_index(index: u64) -> Self {
        Self::ALL[(index % 3) as usize]
    }

    pub fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors) | (Self::Paper, Self::Rock) | (Self::Scissors, Self::Paper)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rock => "Rock",
            Self::Paper => "Paper",
            Self::Scissors => "Scissors",
        }
    }

    pub fn short(self) -> char {
        match self {
            Self::Rock => 'R',
            Self::Paper => 'P',
            Self::Scissors => 'S',
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Outcome {
    pub fn from_keyword(value: &str) -> Option<Self> {
        match crate::tags::keyword(value).as_str() {
            "win" => Some(Self::Win),
            "draw" => Some(Self::Draw),
            "loss" | "lose" => Some(Self::Loss),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Win => "Win",
            Self::Draw => "Draw",
            Self::Loss => "Loss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("Player"),
            Self::Opponent => f.write_str("Opponent"),
        }
    }
}

/// Outcome from the player's point of view.
pub fn judge(player: Choice, opponent: Choice) -> Outcome {
    if player == opponent {
        Outcome::Draw
    } else if player.beats(opponent) {
        Outcome::Win
    } else {
        Outcome::Loss
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCounts {
    pub rock: u32,
    pub paper: u32,
    pub scissors: u32,
}

impl HandCounts {
    pub fn of(hand: &[Choice]) -> Self {
        let mut counts = Self::default();
        for choice in hand {
            match choice {
                Choice::Rock => counts.rock += 1,
                Choice::Paper => counts.paper += 1,
                Choice::Scissors => counts.scissors += 1,
            }
        }
        counts
    }

    pub fn get(&self, choice: Choice) -> u32 {
        match choice {
            Choice::Rock => self.rock,
            Choice::Paper => self.paper,
            Choice::Scissors => self.scissors,
        }
    }
}

impl fmt::Display for HandCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}P{}S{}", self.rock, self.paper, self.scissors)
    }
}

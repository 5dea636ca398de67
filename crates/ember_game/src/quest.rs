//! Quests and quest management

use crate::object::{GameObject, UpdateContext};
use ember_event::{Message, Publisher, Subscriber};
use std::cell::RefCell;
use std::rc::Rc;

/// A trackable objective. Completion is one-way.
pub trait Quest {
    /// Whether the quest has been completed.
    fn is_complete(&self) -> bool;

    /// XP awarded on completion.
    fn completion_xp(&self) -> u32;
}

/// Owns active quests; publishes rewards and discards quests as they
/// complete.
pub struct QuestManager {
    quests: Vec<Rc<RefCell<dyn Quest>>>,
    publisher: Publisher,
}

impl QuestManager {
    /// Create an empty manager.
    pub fn new(publisher: Publisher) -> Self {
        Self {
            quests: Vec::new(),
            publisher,
        }
    }

    /// Add a quest to track.
    pub fn add(&mut self, quest: Rc<RefCell<dyn Quest>>) {
        self.quests.push(quest);
    }

    /// Number of quests still being tracked.
    pub fn quest_count(&self) -> usize {
        self.quests.len()
    }
}

impl GameObject for QuestManager {
    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {
        // Completed quests publish their reward once, then are dropped;
        // their subscriptions die with them.
        let mut remaining = Vec::with_capacity(self.quests.len());
        for quest in self.quests.drain(..) {
            let complete = quest.borrow().is_complete();
            if complete {
                let xp = quest.borrow().completion_xp();
                log::info!("quest complete, awarding {xp} xp");
                self.publisher.publish(Message::QuestComplete { xp });
            } else {
                remaining.push(quest);
            }
        }
        self.quests = remaining;
    }
}

const KILL_QUEST_XP: u32 = 50;

/// Quest to kill a number of enemies, tallied from KilledEnemy messages.
pub struct KillEnemyQuest {
    remaining: u32,
    complete: bool,
}

impl KillEnemyQuest {
    /// Create a quest requiring `enemy_count` kills.
    pub fn new(enemy_count: u32) -> Self {
        Self {
            remaining: enemy_count,
            complete: enemy_count == 0,
        }
    }
}

impl Quest for KillEnemyQuest {
    fn is_complete(&self) -> bool {
        self.complete
    }

    fn completion_xp(&self) -> u32 {
        KILL_QUEST_XP
    }
}

impl Subscriber for KillEnemyQuest {
    fn handle_message(&mut self, message: &Message) {
        if !matches!(message, Message::KilledEnemy { .. }) {
            return;
        }
        if self.complete {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.complete = true;
        }
    }
}

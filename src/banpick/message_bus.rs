use std::sync::Arc;

use anyhow::Result;
use banpick_model::{HeroId, Side};
use futures_util::{Stream, StreamExt};
use log::error;
use serde::Serialize;
use tokio::sync::broadcast::{Receiver, Sender};
use tokio_stream::wrappers::BroadcastStream;

use super::advisor::{ExternalData, SuggestionBatch};
use super::ui_state::UiState;

#[derive(Clone)]
pub(crate) struct MessageBus(Sender<Message>);

impl MessageBus {
    pub fn new() -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(100);
        Self(sender)
    }

    pub fn send(&self, message: Message) {
        if let Err(message) = self.0.send(message) {
            error!("Message not sent {:?}", message);
        }
    }

    pub fn subscribe(&self) -> MessageBusSubscription {
        MessageBusSubscription(self.0.subscribe())
    }
}

pub(crate) struct MessageBusSubscription(Receiver<Message>);

impl MessageBusSubscription {
    pub fn stream(self) -> impl Stream<Item = Result<Message>> {
        BroadcastStream::new(self.0).map(|r| r.map_err(anyhow::Error::from))
    }

    pub fn ui_update_stream(self) -> impl Stream<Item = Result<UiUpdate>> {
        self.stream().filter_map(|r| async move {
            match r {
                Ok(Message::UiUpdate(ui_update)) => Some(Ok(ui_update)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

}

#[derive(Clone, Debug)]
pub(crate) enum Message {
    UiUpdate(UiUpdate),
    UiCommand(UiCommand),
    Event(Event),
}

impl From<UiState> for Message {
    fn from(value: UiState) -> Self {
        Message::UiUpdate(UiUpdate::State(Box::new(value)))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UiUpdate {
    State(Box<UiState>),
}

#[derive(Clone, Debug)]
pub enum UiCommand {
    InitializeUi,
    LockIn(HeroId),
    TogglePause,
    Undo,
    SelectAnalysisMode(String),
    SetBotSide(Option<Side>),
    CloseApplication,
}

#[derive(Clone, Debug)]
pub enum Event {
    /// One wall-clock second elapsed.
    TimerTick,
    DataLoaded(Arc<ExternalData>),
    DataFailed(String),
    SuggestionsReady(Box<SuggestionBatch>),
    /// The bot finished its deliberation delay for the given step.
    BotThinkFinished { step_index: usize },
}

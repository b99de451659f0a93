use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// States in the election lifecycle, with the backend's fixed wire codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Status {
    /// Just created.
    Initial = 0,
    /// Voters can cast ballots.
    Open = 1,
    /// Voters can no longer cast ballots.
    Closed = 2,
    ShuffledBallots = 3,
    /// Every node has submitted its decryption share.
    PubSharesSubmitted = 4,
    ResultAvailable = 5,
    Canceled = 6,
    /// The DKG actors have been created on every node.
    Initialized = 7,
    OnGoingSetup = 8,
    /// The election key has been generated.
    Setup = 9,
    OnGoingShuffle = 10,
    OnGoingDecryption = 11,
}

impl Status {
    /// No action can be taken any more.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ResultAvailable | Self::Canceled)
    }

    /// The backend is working on a long-running step.
    pub fn is_ongoing(self) -> bool {
        matches!(
            self,
            Self::OnGoingSetup | Self::OnGoingShuffle | Self::OnGoingDecryption
        )
    }

    /// The action moving the election forward from this status, if any.
    pub fn next_action(self) -> Option<Action> {
        match self {
            Self::Initial => Some(Action::Initialize),
            Self::Initialized => Some(Action::Setup),
            Self::Setup => Some(Action::Open),
            Self::Open => Some(Action::Close),
            Self::Closed => Some(Action::Shuffle),
            Self::ShuffledBallots => Some(Action::BeginDecryption),
            Self::PubSharesSubmitted => Some(Action::CombineShares),
            Self::OnGoingSetup
            | Self::OnGoingShuffle
            | Self::OnGoingDecryption
            | Self::ResultAvailable
            | Self::Canceled => None,
        }
    }

    /// Every action the status permits, ignoring who asks.
    pub fn legal_actions(self) -> Vec<Action> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.next_action()
            .into_iter()
            .chain(std::iter::once(Action::Cancel))
            .collect()
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initial => "initial",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::ShuffledBallots => "shuffled ballots",
            Self::PubSharesSubmitted => "public shares submitted",
            Self::ResultAvailable => "result available",
            Self::Canceled => "canceled",
            Self::Initialized => "initialized",
            Self::OnGoingSetup => "ongoing setup",
            Self::Setup => "setup",
            Self::OnGoingShuffle => "ongoing shuffle",
            Self::OnGoingDecryption => "ongoing decryption",
        };
        write!(f, "{name}")
    }
}

/// Status of the DKG actor on one node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum NodeStatus {
    /// Client-side only: the actor has not been created yet.
    NotInitialized = -1,
    Initialized = 0,
    Setup = 1,
    Failed = 2,
}

/// Operations an administrator can request on an election.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Initialize,
    Setup,
    Open,
    Close,
    Shuffle,
    BeginDecryption,
    CombineShares,
    Cancel,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Setup => "setup",
            Self::Open => "open",
            Self::Close => "close",
            Self::Shuffle => "shuffle",
            Self::BeginDecryption => "beginDecryption",
            Self::CombineShares => "combineShares",
            Self::Cancel => "cancel",
        }
    }

    /// What the election is doing while this action is in flight.
    pub fn ongoing(self) -> OngoingAction {
        match self {
            Self::Initialize => OngoingAction::Initializing,
            Self::Setup => OngoingAction::SettingUp,
            Self::Open => OngoingAction::Opening,
            Self::Close => OngoingAction::Closing,
            Self::Shuffle => OngoingAction::Shuffling,
            Self::BeginDecryption => OngoingAction::Decrypting,
            Self::CombineShares => OngoingAction::Combining,
            Self::Cancel => OngoingAction::Canceling,
        }
    }

    /// Statuses the backend may confirm once this action has been accepted.
    pub fn expected_statuses(self) -> &'static [Status] {
        match self {
            Self::Initialize => &[Status::Initialized],
            Self::Setup => &[Status::OnGoingSetup, Status::Setup],
            Self::Open => &[Status::Open],
            Self::Close => &[Status::Closed],
            Self::Shuffle => &[Status::OnGoingShuffle, Status::ShuffledBallots],
            Self::BeginDecryption => &[Status::OnGoingDecryption, Status::PubSharesSubmitted],
            Self::CombineShares => &[Status::ResultAvailable],
            Self::Cancel => &[Status::Canceled],
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A long-running action started from this client. `None` is modelled as
/// the absence of a value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum OngoingAction {
    Initializing = 0,
    SettingUp = 1,
    Opening = 2,
    Closing = 3,
    Canceling = 4,
    Shuffling = 5,
    Decrypting = 6,
    Combining = 7,
}

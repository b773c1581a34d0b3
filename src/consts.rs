//! Shared constants for the drag engine.

// ── Gesture ─────────────────────────────────────────────────────

/// Minimum cursor travel, in CSS pixels, before a press becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

/// Fade-out window for the floating indicator after a committed drop.
pub const SUCCESS_FADE_MS: u32 = 150;

/// Shrink-and-fade window for the floating indicator after a failed drop.
pub const REVERT_FADE_MS: u32 = 300;

// ── DOM hooks ───────────────────────────────────────────────────

/// Attribute carrying a conversation id on rendered items.
pub const CONVERSATION_ID_ATTR: &str = "data-conversation-id";

/// Attribute carrying a folder id on folder containers and headers.
pub const FOLDER_ID_ATTR: &str = "data-folder-id";

/// Optional attribute carrying a conversation title on rendered items.
pub const CONVERSATION_TITLE_ATTR: &str = "data-conversation-title";

/// Link target on host-page items.
pub const HREF_ATTR: &str = "href";

/// Folder container class. The host resolves `ElementInfo::closest_folder` through it.
pub const FOLDER_ITEM_CLASS: &str = "le-chat-plus-folder-item";

/// Class on extension-rendered conversation rows; the host builds the
/// folder and standalone populations from it.
pub const CONVERSATION_ITEM_CLASS: &str = "le-chat-plus-conversation-item";

/// Folder header class; the host tags header drop candidates from it.
pub const FOLDER_HEADER_CLASS: &str = "le-chat-plus-folder-header";

/// Applied to the source element once the threshold is crossed (reduced opacity).
pub const DRAGGING_CLASS: &str = "le-chat-plus-dragging";
pub const DROP_BEFORE_CLASS: &str = "le-chat-plus-drop-before";
pub const DROP_AFTER_CLASS: &str = "le-chat-plus-drop-after";
pub const HEADER_DROP_CLASS: &str = "le-chat-plus-header-drop-target";
pub const FOLDER_DROP_CLASS: &str = "le-chat-plus-folder-drop-target";
pub const ROOT_DROP_CLASS: &str = "le-chat-plus-root-drop-target";

/// Every class the classifier may apply; cleared before each re-classification.
pub const HIGHLIGHT_CLASSES: [&str; 5] =
    [DROP_BEFORE_CLASS, DROP_AFTER_CLASS, HEADER_DROP_CLASS, FOLDER_DROP_CLASS, ROOT_DROP_CLASS];

// ── Conversation data ───────────────────────────────────────────

/// Origin of the chat application, for resolving relative links.
pub const CHAT_ORIGIN: &str = "https://chat.mistral.ai";

/// Base URL of a hosted conversation; the conversation id is appended.
pub const CHAT_URL_BASE: &str = "https://chat.mistral.ai/chat/";

/// Title used when neither the element nor the store knows one.
pub const PLACEHOLDER_TITLE: &str = "[Untitled conversation]";

// ── Storage keys ────────────────────────────────────────────────

pub const FOLDERS_KEY: &str = "le-chat-plus-folders";
pub const STANDALONE_KEY: &str = "le-chat-plus-standalone-conversations";

/// Prefix for per-folder conversation list keys; the folder id is appended.
pub const FOLDER_CONVERSATIONS_PREFIX: &str = "le-chat-plus-folder-conversations-";

// Keywire Core Library
// Layout-aware keyboard injection and global key listening

pub mod input;
pub mod key;
pub mod keysym;
pub mod layout;
pub mod modifier;
pub mod output;
pub mod settings;
pub mod symbols;

pub use input::{KeyEvent, Listener, ListenerError, ListenerState, RawKeyEvent};
pub use key::{key_from_name, Key};
pub use keysym::Keysym;
pub use layout::{detect_layout_identity, LayoutIdentity};
pub use modifier::{ComboParseError, KeyWithModifier, Modifier};
pub use output::{
    Backend, BackendError, BackendType, Capabilities, KeyCodeMap, MemoryBackend,
    ModifierTracker, Sender, SenderBuilder,
};
pub use settings::{Settings, SettingsError};
pub use symbols::{KeyTranslator, SymbolError, SymbolTable};

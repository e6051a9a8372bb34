use alloc::boxed::Box;
use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;

use hashbrown::HashMap;
use pixeldeck_protocol::SavedGame;

use crate::*;

/// Every game the console knows how to run, keyed by catalog `internal_id`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GameKind {
    Snake,
    TicTacToe,
    Caro4,
    Caro5,
    Memory,
    Line,
    Paint,
}

impl GameKind {
    pub const ALL: [GameKind; 7] = [
        GameKind::Snake,
        GameKind::TicTacToe,
        GameKind::Caro4,
        GameKind::Caro5,
        GameKind::Memory,
        GameKind::Line,
        GameKind::Paint,
    ];

    pub const fn internal_id(self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::TicTacToe => "tictactoe",
            GameKind::Caro4 => "caro4",
            GameKind::Caro5 => "caro5",
            GameKind::Memory => "memory",
            GameKind::Line => "line",
            GameKind::Paint => "paint",
        }
    }

    /// Short title that fits the 20-dot matrix.
    pub const fn label(self) -> &'static str {
        match self {
            GameKind::Snake => "SNAKE",
            GameKind::TicTacToe => "XO",
            GameKind::Caro4 => "CARO4",
            GameKind::Caro5 => "CARO5",
            GameKind::Memory => "MEMO",
            GameKind::Line => "LINE",
            GameKind::Paint => "PAINT",
        }
    }

    pub fn icons(self) -> (&'static Icon, Option<&'static Icon>) {
        match self {
            GameKind::Snake => (&icons::SNAKE, None),
            GameKind::TicTacToe => (&icons::TICTACTOE, None),
            GameKind::Caro4 | GameKind::Caro5 => (&icons::CARO, Some(&icons::CARO_ACCENT)),
            GameKind::Memory => (&icons::MEMORY, None),
            GameKind::Line => (&icons::LINE, None),
            GameKind::Paint => (&icons::PAINT, None),
        }
    }

    pub const fn color(self) -> Color {
        match self {
            GameKind::Snake => palette::GREEN,
            GameKind::TicTacToe => palette::RED,
            GameKind::Caro4 | GameKind::Caro5 => palette::RED,
            GameKind::Memory => palette::PURPLE,
            GameKind::Line => palette::YELLOW,
            GameKind::Paint => palette::ORANGE,
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.internal_id())
    }
}

impl FromStr for GameKind {
    type Err = ConsoleError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.internal_id() == s)
            .ok_or_else(|| ConsoleError::UnknownGame(s.to_string()))
    }
}

fn boxed<A: GameAdapter + 'static>(adapter: A) -> Box<dyn GameAdapter> {
    Box::new(adapter)
}

/// How to build and thumbnail one kind of game.
#[derive(Copy, Clone)]
pub struct GameFactory {
    pub create: fn(AdapterContext) -> Box<dyn GameAdapter>,
    pub preview: fn(Option<&SavedGame>, Tick) -> Frame,
}

impl fmt::Debug for GameFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameFactory").finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Registry {
    factories: HashMap<GameKind, GameFactory>,
}

impl Registry {
    /// Registry with a factory for every [`GameKind`].
    pub fn standard() -> Self {
        let mut registry = Self::default();
        registry.register(
            GameKind::Snake,
            GameFactory {
                create: |ctx| boxed(SnakeAdapter::new(ctx)),
                preview: SnakeAdapter::preview,
            },
        );
        registry.register(
            GameKind::TicTacToe,
            GameFactory {
                create: |ctx| boxed(TicTacToeAdapter::new(ctx)),
                preview: TicTacToeAdapter::preview,
            },
        );
        registry.register(
            GameKind::Caro4,
            GameFactory {
                create: |ctx| boxed(CaroAdapter::new(ctx, 4)),
                preview: Caro4Preview::preview,
            },
        );
        registry.register(
            GameKind::Caro5,
            GameFactory {
                create: |ctx| boxed(CaroAdapter::new(ctx, 5)),
                preview: Caro5Preview::preview,
            },
        );
        registry.register(
            GameKind::Memory,
            GameFactory {
                create: |ctx| boxed(MemoryAdapter::new(ctx)),
                preview: MemoryAdapter::preview,
            },
        );
        registry.register(
            GameKind::Line,
            GameFactory {
                create: |ctx| boxed(LineAdapter::new(ctx)),
                preview: LineAdapter::preview,
            },
        );
        registry.register(
            GameKind::Paint,
            GameFactory {
                create: |ctx| boxed(PaintAdapter::new(ctx)),
                preview: PaintAdapter::preview,
            },
        );
        registry
    }

    pub fn register(&mut self, kind: GameKind, factory: GameFactory) {
        if self.factories.insert(kind, factory).is_some() {
            log::debug!("replaced factory for {}", kind);
        }
    }

    pub fn factory(&self, kind: GameKind) -> Result<&GameFactory> {
        self.factories
            .get(&kind)
            .ok_or(ConsoleError::MissingFactory(kind))
    }

    /// Fails on the first kind without a factory.
    pub fn validate(&self) -> Result<()> {
        for kind in GameKind::ALL {
            self.factory(kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_ids_parse() {
        for kind in GameKind::ALL {
            assert_eq!(kind.internal_id().parse::<GameKind>(), Ok(kind));
        }
        assert_eq!("caro5".parse(), Ok(GameKind::Caro5));
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert_eq!(
            "chess".parse::<GameKind>(),
            Err(ConsoleError::UnknownGame("chess".to_string()))
        );
        // ids are matched exactly
        assert!("Snake".parse::<GameKind>().is_err());
    }

    #[test]
    fn standard_registry_is_complete() {
        assert_eq!(Registry::standard().validate(), Ok(()));
    }

    #[test]
    fn missing_factory_fails_validation() {
        let mut registry = Registry::default();
        registry.register(
            GameKind::Snake,
            GameFactory {
                create: |ctx| boxed(SnakeAdapter::new(ctx)),
                preview: SnakeAdapter::preview,
            },
        );
        assert_eq!(
            registry.validate(),
            Err(ConsoleError::MissingFactory(GameKind::TicTacToe))
        );
    }

    #[test]
    fn labels_fit_the_matrix() {
        for kind in GameKind::ALL {
            assert!(text_width(kind.label()) <= MATRIX_SIZE as i32, "{kind}");
        }
    }

    #[test]
    fn previews_without_saves_show_titles() {
        let registry = Registry::standard();
        for kind in GameKind::ALL {
            let factory = registry.factory(kind).unwrap();
            assert_eq!((factory.preview)(None, 0), title_frame(kind, 0));
        }
    }
}

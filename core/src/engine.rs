use crate::*;

/// Request/response boundary to the authoritative engine.
///
/// The engine owns mine placement, adjacency counts, flood-fill and the mark cycle. Every method is a single
/// round trip that the caller awaits.
#[allow(async_fn_in_trait)]
pub trait GameEngine {
    /// Generates the board around the first reveal, every cell still hidden.
    async fn generate_board(&self, request: GenerateBoard) -> EngineResult<CellRows>;

    async fn poke(&self, x: Coord, y: Coord) -> EngineResult<ChangeBatch>;

    /// Advances the mark cycle of a hidden cell.
    async fn mark(&self, x: Coord, y: Coord) -> EngineResult<ChangeBatch>;

    async fn set_game_settings(&self, settings: GameSettings) -> EngineResult<()>;
}

impl<E: GameEngine + ?Sized> GameEngine for &E {
    async fn generate_board(&self, request: GenerateBoard) -> EngineResult<CellRows> {
        (**self).generate_board(request).await
    }

    async fn poke(&self, x: Coord, y: Coord) -> EngineResult<ChangeBatch> {
        (**self).poke(x, y).await
    }

    async fn mark(&self, x: Coord, y: Coord) -> EngineResult<ChangeBatch> {
        (**self).mark(x, y).await
    }

    async fn set_game_settings(&self, settings: GameSettings) -> EngineResult<()> {
        (**self).set_game_settings(settings).await
    }
}

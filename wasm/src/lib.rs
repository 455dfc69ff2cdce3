use minesweeper_kb as ms;
use wasm_bindgen::prelude::*;

fn load(bts: &[u8]) -> Result<ms::KnowledgeBase, String> {
    ms::KnowledgeBase::from_bytes(bts).map_err(|e| e.to_string())
}

fn flatten<'a>(points: impl IntoIterator<Item = &'a ms::Point>) -> Vec<u32> {
    points
        .into_iter()
        .flat_map(|p| [p.row as u32, p.col as u32])
        .collect()
}

#[wasm_bindgen]
pub fn create_solver(height: usize, width: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let knowledge = ms::KnowledgeBase::new(height, width);
    knowledge.to_bytes().map_err(|e| e.to_string())
}

/// Feeds one probed cell into the knowledge base and returns the updated
/// state.
#[wasm_bindgen]
pub fn observe(bts: Vec<u8>, row: usize, col: usize, count: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut knowledge = load(&bts)?;
    knowledge
        .observe(ms::Point::new(row, col), count)
        .map_err(|e| e.to_string())?;
    knowledge.to_bytes().map_err(|e| e.to_string())
}

/// Proven safe cells not probed yet, as flattened `[row, col, ...]` pairs.
#[wasm_bindgen]
pub fn safe_moves(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let knowledge = load(&bts)?;
    Ok(flatten(&knowledge.safe_unplayed()))
}

/// Proven mines, as flattened `[row, col, ...]` pairs.
#[wasm_bindgen]
pub fn known_mines(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let knowledge = load(&bts)?;
    Ok(flatten(knowledge.mines()))
}

/// `[row, col, guessed]` for the suggested next move, or empty if nothing is
/// left to probe.
#[wasm_bindgen]
pub fn suggest_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let knowledge = load(&bts)?;
    let suggestion = ms::choose_move(&knowledge, &mut rand::rng()).map(|next| {
        let point = next.point();
        let guessed = matches!(next, ms::Move::Guess(_));
        vec![point.row as u32, point.col as u32, guessed as u32]
    });
    Ok(suggestion.unwrap_or_default())
}

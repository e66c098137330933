//! Crate root module declarations for the frontier chess expander.
//!
//! The board and move-generation modules form a pure kernel over 8x8 grids
//! seen from the side to move. The frontier and pipeline modules drive that
//! kernel over a shared store of discovered positions.

pub mod errors;

pub mod board {
    pub mod board_codec;
    pub mod board_state;
    pub mod piece_codes;
    pub mod render_board;
}

pub mod move_generation {
    pub mod check_oracle;
    pub mod expander;
    pub mod move_deltas;
    pub mod move_generator;
    pub mod perft;
    pub mod transition;
}

pub mod frontier {
    pub mod edge_hash;
    pub mod frontier_store;
    pub mod memory_frontier;
    pub mod node_record;
}

pub mod pipeline {
    pub mod coordinator;
    pub mod expansion_run;
    pub mod pipeline_config;
    pub mod pipeline_events;
    pub mod shared_run_state;
    pub mod work_queue;
    pub mod worker_pool;
}

pub mod utils {
    pub mod random_walk;
}

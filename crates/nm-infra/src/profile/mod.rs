mod postgrest;

pub use postgrest::PostgrestProfileRepository;

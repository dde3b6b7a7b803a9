// Service exports
pub mod cache;
pub mod nominatim;
pub mod repository;
pub mod supabase;

pub use cache::{CacheError, CacheKey, CacheManager, CachedGeocoder};
pub use nominatim::{GeocodeProviderError, NominatimConfig, NominatimGeocoder};
pub use repository::{CandidateRepository, RepositoryError};
pub use supabase::{SupabaseClient, SupabaseTables};

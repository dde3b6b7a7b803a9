// Model exports
pub mod criteria;
pub mod domain;
pub mod requests;
pub mod responses;

pub use criteria::{DatePosted, SearchCriteria, SortKey, SortOrder};
pub use domain::{BoundingBox, Coordinate, Job, JobStatus, RelevanceScore, Scored, ScoredJob, ScoredWorker, Urgency, Worker};
pub use requests::{DescribeLocationQuery, MatchJobsRequest, MatchWorkersRequest, ResolveLocationQuery, SearchRequest};
pub use responses::{DescribeLocationResponse, ErrorResponse, HealthResponse, ResolveLocationResponse, SearchResponse};

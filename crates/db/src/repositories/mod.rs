//! Repository structs with static async methods, one per aggregate.

pub mod banner_repo;
pub mod company_repo;
pub mod flight_repo;
pub mod notification_repo;
pub mod offer_repo;
pub mod reminder_repo;
pub mod stats_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use banner_repo::BannerRepo;
pub use company_repo::CompanyRepo;
pub use flight_repo::FlightRepo;
pub use notification_repo::NotificationRepo;
pub use offer_repo::OfferRepo;
pub use reminder_repo::ReminderRepo;
pub use stats_repo::StatsRepo;
pub use ticket_repo::TicketRepo;
pub use user_repo::UserRepo;

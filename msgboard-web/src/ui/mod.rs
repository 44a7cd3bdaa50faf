mod app;
pub use app::App;

mod message_card;
pub use message_card::MessageCard;

mod message_list;
pub use message_list::MessageList;

mod post_box;
pub use post_box::PostBox;

mod sign_in;
pub use sign_in::SignIn;

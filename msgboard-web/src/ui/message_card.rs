use msgboard_client::{sized_avatar_url, AnnotatedMessage, AVATAR_SIZE};
use yew::prelude::*;

const AUTHOR_COLORS: [&str; 5] = [
    "green-darker-top",
    "yellow-darker-top",
    "teal-darker-top",
    "magenta-darker-top",
    "orange-darker-top",
];

const COMMENT_COLORS: [&str; 5] = [
    "green-darker-bottom",
    "yellow-darker-bottom",
    "teal-darker-bottom",
    "magenta-darker-bottom",
    "orange-darker-bottom",
];

const AUTHOR_ANGLES: [&str; 4] = ["author-ccw-5", "author-ccw-2", "author-cw-2", "author-cw-5"];

const COMMENT_ANGLES: [&str; 4] = [
    "comment-ccw-1_5",
    "comment-ccw-0_5",
    "comment-cw-0_5",
    "comment-cw-1_5",
];

#[derive(Clone, PartialEq, Properties)]
pub struct MessageCardProps {
    pub message: AnnotatedMessage,

    /// Position in the list, picks the note angles
    pub position: usize,
}

#[function_component(MessageCard)]
pub fn message_card(p: &MessageCardProps) -> Html {
    let m = &p.message;
    let author_color = AUTHOR_COLORS[m.colors.author_index(AUTHOR_COLORS.len())];
    let comment_color = COMMENT_COLORS[m.colors.comment_index(COMMENT_COLORS.len())];
    // angles alternate between neighbours rather than follow the author
    let author_angle = AUTHOR_ANGLES[p.position % AUTHOR_ANGLES.len()];
    let comment_angle = COMMENT_ANGLES[(p.position + 1) % COMMENT_ANGLES.len()];
    let created_at = m.message.created_at.format("%b %-d, %Y %H:%M").to_string();

    html! {
        <li class="message" data-author={m.message.author_id.to_string()}>
            <div class={classes!("author", author_color, author_angle)}>
                <img
                    src={sized_avatar_url(&m.avatar_url, AVATAR_SIZE)}
                    alt={m.display_name.clone()}
                />
                <div class="author-name">{ m.display_name.clone() }</div>
            </div>
            <div class={classes!("comment", comment_color, comment_angle)}>
                <p>{ m.message.comment.clone() }</p>
                <time datetime={m.message.created_at.to_string()}>{ created_at }</time>
            </div>
        </li>
    }
}

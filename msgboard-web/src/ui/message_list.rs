use std::rc::Rc;

use msgboard_client::AnnotatedMessage;
use yew::prelude::*;

use crate::ui;

#[derive(Clone, PartialEq, Properties)]
pub struct MessageListProps {
    pub messages: Rc<Vec<AnnotatedMessage>>,
}

#[function_component(MessageList)]
pub fn message_list(p: &MessageListProps) -> Html {
    html! {
        <ul class="message-list list-unstyled">
            { for p.messages.iter().enumerate().map(|(position, m)| html! {
                <ui::MessageCard
                    key={m.message.id.0}
                    message={m.clone()}
                    position={position}
                />
            }) }
        </ul>
    }
}

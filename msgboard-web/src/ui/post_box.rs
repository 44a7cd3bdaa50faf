use msgboard_client::{api::AuthorMetadata, sized_avatar_url, AVATAR_SIZE};
use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct PostBoxProps {
    pub me: AuthorMetadata,
    pub on_post: Callback<String>,
    pub on_sign_out: Callback<()>,
}

pub struct PostBox {
    text: String,
}

pub enum PostBoxMsg {
    TextChanged(String),
    Submit,
}

impl Component for PostBox {
    type Message = PostBoxMsg;
    type Properties = PostBoxProps;

    fn create(_ctx: &Context<Self>) -> Self {
        PostBox {
            text: String::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            PostBoxMsg::TextChanged(t) => {
                self.text = t;
                false
            }
            PostBoxMsg::Submit => {
                let text = std::mem::take(&mut self.text);
                if !text.trim().is_empty() {
                    ctx.props().on_post.emit(text);
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let me = &ctx.props().me;
        let on_sign_out = ctx.props().on_sign_out.reform(|_: MouseEvent| ());
        html! {
            <div class="post-box">
                <div class="d-flex align-items-center mb-2">
                    <img src={sized_avatar_url(&me.avatar_url, AVATAR_SIZE)} alt="" width="40" />
                    <span class="mx-2">{ me.display_name.clone() }</span>
                    <button type="button" class="btn btn-link" onclick={on_sign_out}>
                        { "Sign out" }
                    </button>
                </div>
                <textarea
                    id="post-input"
                    placeholder="Write a message and press Enter"
                    value={self.text.clone()}
                    oninput={ctx.link().callback(|e: InputEvent| {
                        let input: web_sys::HtmlTextAreaElement = e.target_unchecked_into();
                        PostBoxMsg::TextChanged(input.value())
                    })}
                    onkeydown={ctx.link().batch_callback(|e: KeyboardEvent| {
                        // shift+enter keeps the newline
                        (e.key() == "Enter" && !e.shift_key()).then(|| {
                            e.prevent_default();
                            PostBoxMsg::Submit
                        })
                    })}
                />
            </div>
        }
    }
}

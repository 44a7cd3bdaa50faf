use yew::prelude::*;

#[derive(Clone, PartialEq, Properties)]
pub struct SignInProps {
    pub on_submit: Callback<String>,
}

/// Asks for an OAuth access token; the profile it belongs to is looked up by
/// the app
#[function_component(SignIn)]
pub fn sign_in(p: &SignInProps) -> Html {
    let token = use_state(String::new);
    let onchange = {
        let token = token.clone();
        Callback::from(move |e: web_sys::Event| {
            let input: web_sys::HtmlInputElement = e.target_unchecked_into();
            token.set(input.value());
        })
    };
    let onsubmit = {
        let token = token.clone();
        let on_submit = p.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let t = token.trim();
            if !t.is_empty() {
                on_submit.emit(String::from(t));
            }
        })
    };
    html! {
        <form class="sign-in-form mb-3" {onsubmit}>
            <div class="input-group">
                <label class="input-group-text" for="token">{ "Access token" }</label>
                <input
                    type="password"
                    class="form-control"
                    id="token"
                    placeholder="ya29..."
                    value={(*token).clone()}
                    {onchange}
                />
                <button type="submit" class="btn btn-primary">{ "Sign in" }</button>
            </div>
        </form>
    }
}

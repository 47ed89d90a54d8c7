//! Fixed Python source fragments composed by the assembler. Placeholders use
//! `{name}` markers filled by `replace_placeholders`; braces that belong to
//! Python itself (dict literals, f-strings) are simply never supplied as
//! keys, so substitution leaves them alone.

pub(super) const ENCODING: &str = "\
#!/usr/bin/env python3
# -*- coding: utf-8 -*-
";

pub(super) const IMPORTS: &str = r#"
import asyncio
import logging
import os

import aiohttp
from aiogram import Bot, Dispatcher
from aiogram.client.default import DefaultBotProperties
from aiogram.enums import ParseMode
from aiogram.filters import CommandStart
from aiogram.types import (
    CallbackQuery,
    InlineKeyboardButton,
    InlineKeyboardMarkup,
    KeyboardButton,
    Message,
    ReplyKeyboardMarkup,
)
"#;

pub(super) const BOT_INIT: &str = r#"
logging.basicConfig(level=logging.INFO)
logger = logging.getLogger("{bot_name}")

BOT_TOKEN = os.getenv("BOT_TOKEN", "{bot_token}")
PROJECT_ID = {project_id}
API_BASE_URL = os.getenv("API_BASE_URL", "{api_base_url}")
API_TIMEOUT = aiohttp.ClientTimeout(total=5)

bot = Bot(token=BOT_TOKEN, default=DefaultBotProperties(parse_mode=ParseMode.HTML))
dp = Dispatcher()

# Per-user runtime state: awaited input targets and collected variables.
USER_STATE = {}
USER_VARIABLES = {}
"#;

pub(super) const SAVE_MESSAGE: &str = r#"
async def save_message_to_api(user_id, message_type, message_text, node_id=None, message_data=None):
    """Persist one inbound update to the project API.

    Best effort: a timeout or connection failure is logged and skipped, it
    never blocks the handler chain."""
    payload = {
        "userId": str(user_id),
        "messageType": message_type,
        "messageText": message_text,
        "nodeId": node_id,
        "messageData": message_data,
    }
    url = f"{API_BASE_URL}/api/projects/{PROJECT_ID}/messages"
    try:
        async with aiohttp.ClientSession(timeout=API_TIMEOUT) as session:
            async with session.post(url, json=payload) as response:
                data = await response.json()
                return data.get("data", {}).get("id")
    except Exception as e:
        logger.warning("Failed to persist message: %s", e)
        return None


async def register_telegram_photo(message_id, file_id, media_type="photo"):
    url = f"{API_BASE_URL}/api/projects/{PROJECT_ID}/media/register-telegram-photo"
    payload = {
        "messageId": message_id,
        "fileId": file_id,
        "botToken": BOT_TOKEN,
        "mediaType": media_type,
    }
    try:
        async with aiohttp.ClientSession(timeout=API_TIMEOUT) as session:
            await session.post(url, json=payload)
    except Exception as e:
        logger.warning("Failed to register media: %s", e)
"#;

pub(super) const MIDDLEWARE: &str = r#"
@dp.update.outer_middleware()
async def persistence_middleware(handler, event, data):
    """Persists every inbound message or callback before normal handling
    proceeds. The record is written first; a failed persist logs and
    continues rather than blocking the bot."""
    message = getattr(event, "message", None)
    callback = getattr(event, "callback_query", None)
    if message is not None and message.from_user:
        await save_message_to_api(message.from_user.id, "message", message.text or "")
    elif callback is not None and callback.from_user:
        await save_message_to_api(callback.from_user.id, "callback", callback.data or "")
    return await handler(event, data)
"#;

pub(super) const SAFE_EDIT_OR_SEND: &str = r#"
async def safe_edit_or_send(message, text, reply_markup=None, prefer_edit=True):
    """Try to edit the triggering message in place; on any failure fall back
    to sending a new message. Auto-transitions pass prefer_edit=False and
    skip editing outright."""
    if prefer_edit:
        try:
            return await message.edit_text(text, reply_markup=reply_markup)
        except Exception:
            pass
    return await message.answer(text, reply_markup=reply_markup)
"#;

pub(super) const UTILITIES: &str = r#"
def user_variables(user_id):
    merged = dict(MEDIA_VARIABLES)
    merged.update(USER_VARIABLES.get(str(user_id), {}))
    return merged


def substitute_variables(text, user_id):
    """Replaces {name} markers in outgoing text with the user's variables."""
    for name, value in user_variables(user_id).items():
        if isinstance(value, dict):
            value = value.get("value", "")
        text = text.replace("{" + name + "}", str(value))
    return text


def resolve_user_media(user_id, node):
    """Picks at most one media item for an outgoing message.

    Variable-bound media wins: each attached variable is inspected for
    type-specific keys (audio, video, document, photo), then for the generic
    value key. Only if nothing resolves do the node's static URLs apply.
    First match wins."""
    variables = user_variables(user_id)
    for var_name in node.get("attached", []):
        value = variables.get(var_name)
        if isinstance(value, dict):
            for media_type in ("audio", "video", "document", "photo"):
                url = value.get(media_type)
                if url:
                    return {"type": media_type, "url": url}
            if value.get("value"):
                return {"type": "photo", "url": value["value"]}
        elif value:
            return {"type": "photo", "url": value}
    media = node.get("media") or {}
    for media_type in ("audio", "video", "document", "photo"):
        if media.get(media_type):
            return {"type": media_type, "url": media[media_type]}
    return None


async def send_media_to(sender, chat_id, media, caption):
    if media["type"] == "photo":
        await sender.send_photo(chat_id, media["url"], caption=caption)
    elif media["type"] == "video":
        await sender.send_video(chat_id, media["url"], caption=caption)
    elif media["type"] == "audio":
        await sender.send_audio(chat_id, media["url"], caption=caption)
    else:
        await sender.send_document(chat_id, media["url"], caption=caption)


async def fetch_recipients(table):
    """Reads recipient ids from one source table via the project API."""
    url = f"{API_BASE_URL}/api/projects/{PROJECT_ID}/{table}"
    try:
        async with aiohttp.ClientSession(timeout=API_TIMEOUT) as session:
            async with session.get(url) as response:
                data = await response.json()
                return [str(row.get("userId") or row.get("id")) for row in data.get("data", [])]
    except Exception as e:
        logger.warning("Failed to fetch recipients from %s: %s", table, e)
        return []
"#;

pub(super) const MAIN_FUNCTION: &str = r#"
async def main():
    logger.info("Starting {bot_name}")
{registrations}
    await dp.start_polling(bot)


if __name__ == "__main__":
    asyncio.run(main())
"#;

pub(super) const HANDLER_MESSAGE: &str = r#"
async def {handler_name}(message, user_id):
{handler_body}
"#;

pub(super) const HANDLER_CALLBACK: &str = r#"
async def {handler_name}(callback: CallbackQuery):
    message = callback.message
    user_id = callback.from_user.id
{handler_body}
    await callback.answer()
"#;

pub(super) const HANDLER_COMMAND: &str = r#"
async def {handler_name}(message: Message):
    user_id = message.from_user.id
{handler_body}
"#;
